//! Restructuring scenarios derived from a costed org forest.
//!
//! Every scenario works on its own deep copy of the forest, so pruning one
//! variant never leaks into another.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::domain::entities::{OrgNode, ScenarioSummary, Scenarios};

/// Which restructuring variant to derive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioKind {
    Baseline,
    Moderate,
    Aggressive,
}

impl ScenarioKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            ScenarioKind::Baseline => "Baseline",
            ScenarioKind::Moderate => "Moderate Restructuring",
            ScenarioKind::Aggressive => "Aggressive Restructuring",
        }
    }
}

impl fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// What happens to the reports of a removed position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrphanPolicy {
    /// The removed position takes its whole subtree with it.
    #[default]
    Drop,
    /// Surviving reports move up to the removed position's parent.
    Reattach,
}

/// Pruning thresholds for the scenario variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioPolicy {
    /// Managers with fewer direct reports than this are cut (moderate)
    pub moderate_min_span: usize,
    /// Managers with fewer direct reports than this are cut (aggressive)
    pub aggressive_min_span: usize,
    pub orphans: OrphanPolicy,
}

impl Default for ScenarioPolicy {
    fn default() -> Self {
        Self {
            moderate_min_span: 3,
            aggressive_min_span: 10,
            orphans: OrphanPolicy::Drop,
        }
    }
}

/// Summarize baseline, moderate, and aggressive variants of a costed forest.
#[instrument(level = "debug", skip(tree))]
pub fn build_scenarios(tree: &[OrgNode], policy: &ScenarioPolicy) -> Scenarios {
    let baseline = summarize_tree(tree, ScenarioKind::Baseline.display_name());

    let moderate = variant_summary(tree, ScenarioKind::Moderate, policy, &baseline);
    let aggressive = variant_summary(tree, ScenarioKind::Aggressive, policy, &baseline);

    debug!(
        baseline = baseline.total_cost,
        moderate = moderate.total_cost,
        aggressive = aggressive.total_cost,
        "built scenarios"
    );
    Scenarios {
        baseline,
        moderate,
        aggressive,
    }
}

fn variant_summary(
    tree: &[OrgNode],
    kind: ScenarioKind,
    policy: &ScenarioPolicy,
    baseline: &ScenarioSummary,
) -> ScenarioSummary {
    let pruned = prune_tree(tree.to_vec(), kind, policy);
    let mut summary = summarize_tree(&pruned, kind.display_name());
    let savings = baseline.total_cost.saturating_sub(summary.total_cost);
    summary.savings_vs_baseline = Some(savings);
    summary.savings_percentage = Some(if baseline.total_cost == 0 {
        0.0
    } else {
        savings as f64 / baseline.total_cost as f64 * 100.0
    });
    summary
}

/// Prune a forest according to a scenario. Baseline returns it unchanged.
pub fn prune_tree(tree: Vec<OrgNode>, kind: ScenarioKind, policy: &ScenarioPolicy) -> Vec<OrgNode> {
    let pruner = match kind {
        ScenarioKind::Baseline => return tree,
        ScenarioKind::Moderate => Pruner {
            min_span: policy.moderate_min_span,
            aggressive: false,
            orphans: policy.orphans,
        },
        ScenarioKind::Aggressive => Pruner {
            min_span: policy.aggressive_min_span,
            aggressive: true,
            orphans: policy.orphans,
        },
    };

    let mut forest = Vec::with_capacity(tree.len());
    for root in tree {
        pruner.prune(root, 0).append_to(&mut forest);
    }
    forest
}

/// Outcome of pruning one node.
enum Pruned {
    Keep(OrgNode),
    /// The node is gone; `orphans` are its surviving reports, already
    /// re-pointed at the removed node's parent when they are to be kept.
    Remove { orphans: Vec<OrgNode> },
}

impl Pruned {
    fn append_to(self, siblings: &mut Vec<OrgNode>) {
        match self {
            Pruned::Keep(node) => siblings.push(node),
            Pruned::Remove { orphans } => siblings.extend(orphans),
        }
    }
}

struct Pruner {
    min_span: usize,
    aggressive: bool,
    orphans: OrphanPolicy,
}

impl Pruner {
    /// Bottom-up: children first, then the node's span is judged against
    /// its already pruned children.
    fn prune(&self, mut node: OrgNode, depth: usize) -> Pruned {
        // Leaves are always kept
        if node.is_leaf() {
            return Pruned::Keep(node);
        }

        let children = std::mem::take(&mut node.children);
        for child in children {
            self.prune(child, depth + 1).append_to(&mut node.children);
        }
        let span = node.span_of_control();

        if self.aggressive {
            if span < 2 && depth > 0 {
                return self.remove(node);
            }

            // Collapse a single-child chain onto the child
            if span == 1 && !node.children[0].is_leaf() {
                let mut child = node.children.remove(0);
                child.parent_id = node.parent_id.take();
                return Pruned::Keep(child);
            }
        }

        if span > 0 && span < self.min_span {
            return self.remove(node);
        }

        Pruned::Keep(node)
    }

    fn remove(&self, node: OrgNode) -> Pruned {
        match self.orphans {
            OrphanPolicy::Drop => Pruned::Remove {
                orphans: Vec::new(),
            },
            OrphanPolicy::Reattach => {
                let parent_id = node.parent_id;
                let orphans = node
                    .children
                    .into_iter()
                    .map(|mut child| {
                        child.parent_id = parent_id.clone();
                        child
                    })
                    .collect();
                Pruned::Remove { orphans }
            }
        }
    }
}

/// Aggregate FTE, cost, head count, and average span of control.
pub fn summarize_tree(tree: &[OrgNode], name: &str) -> ScenarioSummary {
    let mut totals = Totals::default();
    for root in tree {
        totals.visit(root);
    }

    let avg_span_of_control = if totals.managers > 0 {
        round_to_tenth(totals.direct_reports as f64 / totals.managers as f64)
    } else {
        0.0
    };

    ScenarioSummary {
        name: name.to_string(),
        total_fte: round_to_tenth(totals.fte),
        total_cost: totals.cost,
        position_count: totals.positions,
        avg_span_of_control,
        savings_vs_baseline: None,
        savings_percentage: None,
    }
}

#[derive(Default)]
struct Totals {
    fte: f64,
    cost: i64,
    positions: usize,
    managers: usize,
    direct_reports: usize,
}

impl Totals {
    fn visit(&mut self, node: &OrgNode) {
        self.fte += node.fte;
        // Out-of-range FTE or rates saturate instead of overflowing
        self.cost = self.cost.saturating_add(node.annual_cost.unwrap_or(0));
        self.positions += 1;
        if !node.is_leaf() {
            self.managers += 1;
            self.direct_reports += node.span_of_control();
            for child in &node.children {
                self.visit(child);
            }
        }
    }
}

fn round_to_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
