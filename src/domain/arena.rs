use generational_arena::{Arena, Index};
use tracing::instrument;

use crate::domain::entities::{OrgNode, RoleRecord};

/// Arena slot for one role while the hierarchy is being wired up.
#[derive(Debug)]
pub struct ArenaNode {
    /// Role payload for this node
    pub role: RoleRecord,
    /// Index of the attached parent, None while the node is a root
    pub parent: Option<Index>,
    /// Indices of attached children, in attachment order
    pub children: Vec<Index>,
}

/// Arena-based forest used during tree construction.
///
/// Unlike the owned `OrgNode` forest it produces, the arena keeps parent
/// back-links, so ancestor chains can be walked before every attachment.
#[derive(Debug, Default)]
pub struct RoleArena {
    arena: Arena<ArenaNode>,
    /// Insertion order of all nodes; roots are the ones without a parent
    order: Vec<Index>,
}

impl RoleArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(n: usize) -> Self {
        Self {
            arena: Arena::with_capacity(n),
            order: Vec::with_capacity(n),
        }
    }

    #[instrument(level = "trace", skip(self, role), fields(id = %role.id))]
    pub fn insert_node(&mut self, role: RoleRecord) -> Index {
        let idx = self.arena.insert(ArenaNode {
            role,
            parent: None,
            children: Vec::new(),
        });
        self.order.push(idx);
        idx
    }

    pub fn get_node(&self, idx: Index) -> Option<&ArenaNode> {
        self.arena.get(idx)
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Iterates over the attached ancestors of `idx`, nearest first.
    pub fn ancestors(&self, idx: Index) -> Ancestors<'_> {
        Ancestors {
            arena: self,
            next: self.get_node(idx).and_then(|n| n.parent),
        }
    }

    /// True if hanging `child` below `parent` would close a loop.
    pub fn would_create_cycle(&self, child: Index, parent: Index) -> bool {
        if child == parent {
            return true;
        }
        std::iter::once(parent)
            .chain(self.ancestors(parent))
            .any(|ancestor| ancestor == child)
    }

    /// Attach `child` below `parent`. The caller checks for cycles first.
    #[instrument(level = "trace", skip(self))]
    pub fn attach(&mut self, child: Index, parent: Index) {
        if let Some(node) = self.arena.get_mut(child) {
            node.parent = Some(parent);
        }
        if let Some(node) = self.arena.get_mut(parent) {
            node.children.push(child);
        }
    }

    /// Root indices in insertion order.
    pub fn roots(&self) -> Vec<Index> {
        self.order
            .iter()
            .copied()
            .filter(|&idx| self.get_node(idx).is_some_and(|n| n.parent.is_none()))
            .collect()
    }

    /// Consume the arena into an owned forest.
    #[instrument(level = "debug", skip(self))]
    pub fn into_forest(mut self) -> Vec<OrgNode> {
        let roots = self.roots();
        roots
            .into_iter()
            .filter_map(|root| self.take_subtree(root))
            .collect()
    }

    fn take_subtree(&mut self, idx: Index) -> Option<OrgNode> {
        let node = self.arena.remove(idx)?;
        let mut org_node = OrgNode::from(node.role);
        org_node.children = node
            .children
            .into_iter()
            .filter_map(|child| self.take_subtree(child))
            .collect();
        Some(org_node)
    }
}

/// Walks parent links upward from a node.
pub struct Ancestors<'a> {
    arena: &'a RoleArena,
    next: Option<Index>,
}

impl Iterator for Ancestors<'_> {
    type Item = Index;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = self.arena.get_node(current).and_then(|n| n.parent);
        Some(current)
    }
}
