//! Domain entities: core data structures

use std::fmt;

use serde::{Deserialize, Serialize};

/// A flat role record as delivered by an assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleRecord {
    pub id: String,
    /// Salary lookup key
    #[serde(alias = "role_title")]
    pub role_title: String,
    /// Full-time equivalent, expected in (0, 2]
    pub fte: f64,
    #[serde(default, alias = "parent_id", skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    /// Depth hint from the source system
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,
    /// Accepted on input, never trusted: costing always recomputes it.
    #[serde(default, alias = "annual_cost", skip_serializing_if = "Option::is_none")]
    pub annual_cost: Option<i64>,
}

impl RoleRecord {
    pub fn new(
        id: impl Into<String>,
        role_title: impl Into<String>,
        fte: f64,
        parent_id: Option<&str>,
    ) -> Self {
        Self {
            id: id.into(),
            role_title: role_title.into(),
            fte,
            parent_id: parent_id.map(str::to_string),
            level: None,
            annual_cost: None,
        }
    }

    pub fn with_level(mut self, level: u32) -> Self {
        self.level = Some(level);
        self
    }

    /// Parent reference, with empty strings treated as "no parent".
    pub fn parent_ref(&self) -> Option<&str> {
        self.parent_id.as_deref().filter(|p| !p.is_empty())
    }
}

/// A node of the org forest. Each node exclusively owns its children;
/// `parent_id` is only a lookup key, never a back reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgNode {
    pub id: String,
    pub role_title: String,
    pub fte: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,
    /// Set by the cost estimator
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annual_cost: Option<i64>,
    #[serde(default)]
    pub children: Vec<OrgNode>,
}

impl OrgNode {
    pub fn span_of_control(&self) -> usize {
        self.children.len()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
}

impl From<RoleRecord> for OrgNode {
    fn from(role: RoleRecord) -> Self {
        let parent_id = role.parent_ref().map(str::to_string);
        Self {
            id: role.id,
            role_title: role.role_title,
            fte: role.fte,
            parent_id,
            level: role.level,
            annual_cost: None,
            children: Vec::new(),
        }
    }
}

impl fmt::Display for OrgNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}] fte={}", self.role_title, self.id, self.fte)?;
        if let Some(cost) = self.annual_cost {
            write!(f, " cost={}", cost)?;
        }
        Ok(())
    }
}

/// Category of a structural anomaly found by the validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueKind {
    DuplicateId,
    ExcessiveDepth,
    InvalidFte,
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IssueKind::DuplicateId => "DUPLICATE_ID",
            IssueKind::ExcessiveDepth => "EXCESSIVE_DEPTH",
            IssueKind::InvalidFte => "INVALID_FTE",
        };
        f.write_str(s)
    }
}

/// Advisory finding about the tree. Never halts the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    #[serde(rename = "type")]
    pub kind: IssueKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
}

/// Read-only aggregate of one scenario tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioSummary {
    pub name: String,
    pub total_fte: f64,
    pub total_cost: i64,
    pub position_count: usize,
    pub avg_span_of_control: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub savings_vs_baseline: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub savings_percentage: Option<f64>,
}

/// The fixed scenario triple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenarios {
    pub baseline: ScenarioSummary,
    pub moderate: ScenarioSummary,
    pub aggressive: ScenarioSummary,
}

impl Scenarios {
    pub fn iter(&self) -> impl Iterator<Item = &ScenarioSummary> {
        [&self.baseline, &self.moderate, &self.aggressive].into_iter()
    }
}
