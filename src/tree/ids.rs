//! Numeric node id allocation for schema 2

use super::node::TreeNode;
use crate::scene::SceneGraph;

/// Hands out node ids that never repeat within a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdAllocator {
    next: i64,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdAllocator {
    pub fn new() -> Self {
        Self { next: 1 }
    }

    /// Id the next call to [`next_id`](Self::next_id) returns
    pub fn peek(&self) -> i64 {
        self.next
    }

    pub fn next_id(&mut self) -> i64 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// Reset to one past the largest id in the tree (1 for an empty tree).
    /// Ids of 0 or below mark nodes still waiting for an id and are ignored.
    pub fn recompute_from_tree(&mut self, graph: &SceneGraph<TreeNode>) {
        let max = graph
            .depth_first()
            .into_iter()
            .filter_map(|(h, _)| graph.get(h))
            .map(|n| n.node_id)
            .filter(|&id| id > 0)
            .max();
        self.next = max.map_or(1, |m| m.saturating_add(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::TreeNodeType;

    #[test]
    fn test_empty_tree_starts_at_one() {
        let mut ids = IdAllocator::new();
        ids.next_id();
        ids.next_id();
        ids.recompute_from_tree(&SceneGraph::new());
        assert_eq!(ids.next_id(), 1);
    }

    #[test]
    fn test_recompute_uses_nested_max() {
        let mut graph = SceneGraph::new();
        let group = graph.insert(TreeNode::new(TreeNodeType::Group, 2), None).unwrap();
        graph.insert(TreeNode::new(TreeNodeType::Static, 17), Some(group)).unwrap();
        graph.insert(TreeNode::new(TreeNodeType::Start, 0), None).unwrap();

        let mut ids = IdAllocator::new();
        ids.recompute_from_tree(&graph);
        assert_eq!(ids.peek(), 18);
        assert_eq!(ids.next_id(), 18);
        assert_eq!(ids.next_id(), 19);
    }
}
