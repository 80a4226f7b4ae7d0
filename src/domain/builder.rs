//! Tree builder turning flat role records into an org forest.

use std::collections::HashMap;

use generational_arena::Index;
use tracing::{debug, instrument, warn};

use crate::domain::arena::RoleArena;
use crate::domain::entities::{OrgNode, RoleRecord};
use crate::domain::error::{DomainError, DomainResult};

/// Constructs org forests from role records.
///
/// Roles whose parent is missing, unknown, or would close a cycle become
/// roots. Sibling and root order follow input order.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    id_index: HashMap<String, Index>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a forest from all role records.
    #[instrument(level = "debug", skip(self, roles), fields(roles = roles.len()))]
    pub fn build(&mut self, roles: &[RoleRecord]) -> DomainResult<Vec<OrgNode>> {
        // Reset state for a fresh build
        self.id_index.clear();

        let mut arena = RoleArena::with_capacity(roles.len());
        let mut indices = Vec::with_capacity(roles.len());
        for role in roles {
            check_role(role)?;
            let idx = arena.insert_node(role.clone());
            // First occurrence wins as lookup target for duplicate ids
            self.id_index.entry(role.id.clone()).or_insert(idx);
            indices.push(idx);
        }

        let mut detached = 0usize;
        for (role, &idx) in roles.iter().zip(&indices) {
            let Some(parent_id) = role.parent_ref() else {
                continue;
            };
            let Some(&parent_idx) = self.id_index.get(parent_id) else {
                debug!(id = %role.id, parent_id, "parent not found, treating as root");
                continue;
            };
            if arena.would_create_cycle(idx, parent_idx) {
                warn!(id = %role.id, parent_id, "cycle detected, treating as root");
                detached += 1;
                continue;
            }
            arena.attach(idx, parent_idx);
        }

        let forest = arena.into_forest();
        debug!(roots = forest.len(), detached, "built org forest");
        Ok(forest)
    }
}

/// Build an org forest with a throwaway builder.
pub fn build_org_tree(roles: &[RoleRecord]) -> DomainResult<Vec<OrgNode>> {
    TreeBuilder::new().build(roles)
}

fn check_role(role: &RoleRecord) -> DomainResult<()> {
    if role.id.trim().is_empty() {
        return Err(DomainError::InvalidRole {
            id: role.id.clone(),
            message: "id must not be empty".to_string(),
        });
    }
    if !role.fte.is_finite() {
        return Err(DomainError::InvalidRole {
            id: role.id.clone(),
            message: format!("fte must be a finite number, got {}", role.fte),
        });
    }
    Ok(())
}
