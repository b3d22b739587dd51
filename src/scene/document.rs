//! Level document abstraction shared by both schemas

use std::fmt::Debug;

use serde_json::Value;

use super::graph::{GraphNode, NodeHandle, SceneGraph};
use super::property::{EditError, EditableNode};
use crate::render::RenderNode;
use crate::world::{LevelError, LevelInfo, Schema, Transform};

/// A level in one of the on-disk schemas: header plus a node forest.
///
/// Implementations own node identity (display ids for schema 1, the id
/// allocator for schema 2), so all structural edits go through this trait
/// rather than through the graph directly.
pub trait LevelDocument: Clone + Debug + Sized {
    type Node: GraphNode + EditableNode + RenderNode + Clone + Debug;
    /// Tag used to create new nodes
    type NodeType: Copy + Debug;

    const SCHEMA: Schema;

    /// A fresh level as created by "New"
    fn new_default() -> Self;

    /// Decode a whole level. Individual malformed nodes are substituted,
    /// only a document that is not a level at all is an error.
    fn from_json(value: &Value) -> Result<Self, LevelError>;

    fn to_json(&self) -> Value;

    fn info(&self) -> &LevelInfo;
    fn info_mut(&mut self) -> &mut LevelInfo;

    fn graph(&self) -> &SceneGraph<Self::Node>;

    /// Mutable access to one node's fields (not its place in the tree)
    fn node_mut(&mut self, handle: NodeHandle) -> Option<&mut Self::Node>;

    /// Create a default node of `node_type`. `placement` overrides the type's
    /// default transform; `parent` must be a group (schema 2 only).
    fn add_node(
        &mut self,
        node_type: Self::NodeType,
        placement: Option<Transform>,
        parent: Option<NodeHandle>,
    ) -> Result<NodeHandle, EditError>;

    /// Deep-copy a node (and its subtree) with a new identity, offset by +1 on x and y
    fn duplicate_node(&mut self, handle: NodeHandle) -> Result<NodeHandle, EditError>;

    /// Remove a node and its subtree; returns how many nodes were removed
    fn remove_node(&mut self, handle: NodeHandle) -> Result<usize, EditError>;

    /// One-line description for list widgets
    fn node_label(&self, handle: NodeHandle) -> Option<String>;

    /// Labels for every node in list order, indented two spaces per depth
    fn node_labels(&self) -> Vec<(NodeHandle, String)> {
        self.graph()
            .depth_first()
            .into_iter()
            .filter_map(|(h, depth)| {
                self.node_label(h)
                    .map(|label| (h, format!("{}{}", "  ".repeat(depth), label)))
            })
            .collect()
    }
}

/// Offset applied to duplicated nodes so the copy is visible next to the original
pub const DUPLICATE_OFFSET: crate::world::Vec3 = crate::world::Vec3 { x: 1.0, y: 1.0, z: 0.0 };
