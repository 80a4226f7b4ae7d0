//! Advisory structural checks over an org forest.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::entities::{Issue, IssueKind, OrgNode};

/// Thresholds for the validator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationRules {
    /// Deepest allowed level below a root (root is depth 0)
    pub max_depth: usize,
    /// Largest plausible FTE for a single position
    pub max_fte: f64,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            max_depth: 10,
            max_fte: 2.0,
        }
    }
}

/// Scan the forest for duplicate ids, excessive depth, and invalid FTE values.
///
/// Never fails: findings are returned for display, and callers carry on
/// with the tree regardless.
pub fn validate_tree(tree: &[OrgNode], rules: &ValidationRules) -> Vec<Issue> {
    let mut validator = Validator {
        rules,
        seen: HashSet::new(),
        issues: Vec::new(),
    };
    for root in tree {
        validator.visit(root, 0);
    }
    debug!(issues = validator.issues.len(), "validated org forest");
    validator.issues
}

struct Validator<'a> {
    rules: &'a ValidationRules,
    seen: HashSet<&'a str>,
    issues: Vec<Issue>,
}

impl<'a> Validator<'a> {
    fn visit(&mut self, node: &'a OrgNode, depth: usize) {
        if !self.seen.insert(node.id.as_str()) {
            self.push(
                IssueKind::DuplicateId,
                format!("Duplicate node ID found: {}", node.id),
                node,
            );
        }

        if depth > self.rules.max_depth {
            self.push(
                IssueKind::ExcessiveDepth,
                format!("Node at excessive depth ({}): {}", depth, node.role_title),
                node,
            );
        }

        if node.fte <= 0.0 || node.fte > self.rules.max_fte {
            self.push(
                IssueKind::InvalidFte,
                format!("Invalid FTE value ({}) for {}", node.fte, node.role_title),
                node,
            );
        }

        for child in &node.children {
            self.visit(child, depth + 1);
        }
    }

    fn push(&mut self, kind: IssueKind, message: String, node: &OrgNode) {
        self.issues.push(Issue {
            kind,
            message,
            node_id: Some(node.id.clone()),
        });
    }
}
