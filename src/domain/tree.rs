//! Traversal, metrics, and layout helpers for org forests.

use termtree::Tree;
use tracing::instrument;

use crate::domain::entities::OrgNode;

/// Pre-order walk over a forest, yielding each node with its depth.
pub struct PreOrder<'a> {
    stack: Vec<(&'a OrgNode, usize)>,
}

impl<'a> PreOrder<'a> {
    pub fn new(tree: &'a [OrgNode]) -> Self {
        // Push in reverse order for left-to-right traversal
        let stack = tree.iter().rev().map(|root| (root, 0)).collect();
        Self { stack }
    }
}

impl<'a> Iterator for PreOrder<'a> {
    type Item = (&'a OrgNode, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let (node, depth) = self.stack.pop()?;
        for child in node.children.iter().rev() {
            self.stack.push((child, depth + 1));
        }
        Some((node, depth))
    }
}

pub fn walk(tree: &[OrgNode]) -> PreOrder<'_> {
    PreOrder::new(tree)
}

pub fn count_nodes(tree: &[OrgNode]) -> usize {
    walk(tree).count()
}

/// Number of levels in the deepest branch; a lone root counts as 1.
#[instrument(level = "trace", skip(tree))]
pub fn max_depth(tree: &[OrgNode]) -> usize {
    walk(tree).map(|(_, depth)| depth + 1).max().unwrap_or(0)
}

/// Order siblings by annual cost, most expensive first, at every level.
pub fn optimize_layout(mut tree: Vec<OrgNode>) -> Vec<OrgNode> {
    for root in &mut tree {
        sort_children(root);
    }
    tree
}

fn sort_children(node: &mut OrgNode) {
    for child in &mut node.children {
        sort_children(child);
    }
    // stable: equal costs keep input order
    node.children
        .sort_by(|a, b| b.annual_cost.unwrap_or(0).cmp(&a.annual_cost.unwrap_or(0)));
}

/// Conversion into a printable terminal tree.
pub trait TreeNodeConvert {
    fn to_tree_string(&self) -> Tree<String>;
}

impl TreeNodeConvert for OrgNode {
    fn to_tree_string(&self) -> Tree<String> {
        let leaves: Vec<_> = self.children.iter().map(|c| c.to_tree_string()).collect();
        Tree::new(self.to_string()).with_leaves(leaves)
    }
}

impl TreeNodeConvert for [OrgNode] {
    fn to_tree_string(&self) -> Tree<String> {
        let leaves: Vec<_> = self.iter().map(|root| root.to_tree_string()).collect();
        Tree::new("Organization".to_string()).with_leaves(leaves)
    }
}
