//! Org chart build service
//!
//! Orchestrates build → validate → cost → scenarios for one set of roles.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::application::ApplicationResult;
use crate::config::Settings;
use crate::domain::{
    build_scenarios, estimate_cost, prune_tree, validate_tree, Issue, OrgNode, RateTable,
    RoleRecord, ScenarioKind, Scenarios, TreeBuilder,
};

/// Output of one chart build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartBuildResult {
    /// Costed baseline forest
    pub tree: Vec<OrgNode>,
    pub scenarios: Scenarios,
    /// Advisory findings for display
    pub issues: Vec<Issue>,
}

/// Service building costed org charts with scenarios.
pub struct ChartService {
    settings: Arc<Settings>,
}

impl ChartService {
    /// Create a new chart service.
    pub fn new(settings: Arc<Settings>) -> Self {
        Self { settings }
    }

    /// Effective rate table: configured rates plus per-request overrides.
    pub fn rate_table(&self, custom_rates: Option<&BTreeMap<String, f64>>) -> RateTable {
        let table = self.settings.rate_table();
        match custom_rates {
            Some(overrides) => table.with_overrides(overrides),
            None => table,
        }
    }

    /// Build the costed tree, its scenarios, and the advisory issues.
    ///
    /// Only malformed role input fails; structural problems end up in
    /// `issues` and the build carries on.
    #[instrument(level = "debug", skip_all, fields(roles = roles.len()))]
    pub fn build_chart(
        &self,
        roles: &[RoleRecord],
        custom_rates: Option<&BTreeMap<String, f64>>,
    ) -> ApplicationResult<ChartBuildResult> {
        // 1. Build hierarchical tree structure
        let tree = TreeBuilder::new().build(roles)?;
        debug!(roots = tree.len(), "tree built");

        // 2. Validate tree structure
        let issues = validate_tree(&tree, &self.settings.validation);

        // 3. Apply costing
        let rates = self.rate_table(custom_rates);
        let tree = estimate_cost(tree, &rates);

        // 4. Generate scenarios
        let scenarios = build_scenarios(&tree, &self.settings.scenarios);

        info!(
            roles = roles.len(),
            issues = issues.len(),
            baseline_cost = scenarios.baseline.total_cost,
            "org chart built"
        );
        Ok(ChartBuildResult {
            tree,
            scenarios,
            issues,
        })
    }

    /// The pruned forest behind one scenario of a built chart.
    pub fn scenario_tree(&self, result: &ChartBuildResult, kind: ScenarioKind) -> Vec<OrgNode> {
        prune_tree(result.tree.clone(), kind, &self.settings.scenarios)
    }
}
