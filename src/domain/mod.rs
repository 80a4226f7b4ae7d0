//! Domain layer: entities and business logic
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod builder;
pub mod costing;
pub mod entities;
pub mod error;
pub mod scenario;
pub mod tree;
pub mod validator;

pub use arena::RoleArena;
pub use builder::{build_org_tree, TreeBuilder};
pub use costing::{estimate_cost, RateTable, DEFAULT_ROLE_RATES};
pub use entities::*;
pub use error::{DomainError, DomainResult};
pub use scenario::{
    build_scenarios, prune_tree, summarize_tree, OrphanPolicy, ScenarioKind, ScenarioPolicy,
};
pub use tree::{count_nodes, max_depth, optimize_layout, walk, TreeNodeConvert};
pub use validator::{validate_tree, ValidationRules};
