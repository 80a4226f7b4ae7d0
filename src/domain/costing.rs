//! Role-title based cost estimation.

use std::collections::BTreeMap;

use tracing::debug;

use crate::domain::entities::OrgNode;

/// Title used when a role title has no rate of its own.
pub const FALLBACK_TITLE: &str = "Analyst";

/// Rate used when neither the title nor the fallback title is known.
pub const DEFAULT_RATE: f64 = 65_000.0;

/// Built-in annual rates (USD) per role title.
pub const DEFAULT_ROLE_RATES: [(&str, f64); 18] = [
    ("CEO", 300_000.0),
    ("CFO", 250_000.0),
    ("CTO", 250_000.0),
    ("VP", 180_000.0),
    ("Director", 150_000.0),
    ("Senior Manager", 120_000.0),
    ("Manager", 95_000.0),
    ("Senior Analyst", 80_000.0),
    ("Analyst", 65_000.0),
    ("Coordinator", 55_000.0),
    ("Assistant", 45_000.0),
    ("Administrator", 50_000.0),
    ("Specialist", 70_000.0),
    ("Lead", 85_000.0),
    ("Principal", 140_000.0),
    ("Senior Director", 200_000.0),
    ("Executive", 220_000.0),
    ("President", 350_000.0),
];

/// Title → annual rate lookup with fallbacks.
///
/// Built from the defaults and then layered with overrides; an override for a
/// title replaces that title's rate and leaves every other title untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct RateTable {
    rates: BTreeMap<String, f64>,
    fallback_title: String,
    default_rate: f64,
}

impl Default for RateTable {
    fn default() -> Self {
        Self {
            rates: DEFAULT_ROLE_RATES
                .iter()
                .map(|(title, rate)| (title.to_string(), *rate))
                .collect(),
            fallback_title: FALLBACK_TITLE.to_string(),
            default_rate: DEFAULT_RATE,
        }
    }
}

impl RateTable {
    /// A table without any titles, only the hard default.
    pub fn empty() -> Self {
        Self {
            rates: BTreeMap::new(),
            fallback_title: FALLBACK_TITLE.to_string(),
            default_rate: DEFAULT_RATE,
        }
    }

    pub fn with_fallback(mut self, fallback_title: impl Into<String>, default_rate: f64) -> Self {
        self.fallback_title = fallback_title.into();
        self.default_rate = default_rate;
        self
    }

    /// Layer `overrides` on top of the current rates.
    pub fn with_overrides<'a, I>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (&'a String, &'a f64)>,
    {
        for (title, rate) in overrides {
            self.rates.insert(title.clone(), *rate);
        }
        self
    }

    pub fn insert(&mut self, title: impl Into<String>, rate: f64) {
        self.rates.insert(title.into(), rate);
    }

    /// Resolve the rate for a title: exact title, then the fallback title,
    /// then the hard default.
    pub fn rate_for(&self, title: &str) -> f64 {
        self.rates
            .get(title)
            .or_else(|| self.rates.get(&self.fallback_title))
            .copied()
            .unwrap_or(self.default_rate)
    }

    pub fn rates(&self) -> &BTreeMap<String, f64> {
        &self.rates
    }

    pub fn fallback_title(&self) -> &str {
        &self.fallback_title
    }

    pub fn default_rate(&self) -> f64 {
        self.default_rate
    }
}

/// Annotate every node with `annual_cost = round(fte * rate)`.
///
/// Takes the forest by value, fills in the costs in place, and hands the
/// same forest back.
pub fn estimate_cost(mut tree: Vec<OrgNode>, rates: &RateTable) -> Vec<OrgNode> {
    let mut costed = 0usize;
    for root in &mut tree {
        cost_node(root, rates, &mut costed);
    }
    debug!(nodes = costed, "estimated annual costs");
    tree
}

fn cost_node(node: &mut OrgNode, rates: &RateTable, costed: &mut usize) {
    node.annual_cost = Some(annual_cost(node.fte, rates.rate_for(&node.role_title)));
    *costed += 1;
    for child in &mut node.children {
        cost_node(child, rates, costed);
    }
}

/// The float-to-int cast saturates, so huge products clamp to `i64::MAX`.
fn annual_cost(fte: f64, rate: f64) -> i64 {
    (fte * rate).round() as i64
}
