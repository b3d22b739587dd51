//! Hierarchical level schema (schema 2)
//!
//! Nodes have unique integer ids and groups own ordered children. On disk
//! each entry also carries `parentId`, which is always derived from the
//! tree structure when saving.

pub mod codec;
mod ids;
mod node;

pub use ids::IdAllocator;
pub use node::*;

use std::collections::HashSet;

use log::{debug, warn};
use serde_json::Value;

use crate::scene::{
    EditError, LevelDocument, NodeHandle, SceneGraph, DUPLICATE_OFFSET,
};
use crate::world::{LevelError, LevelInfo, Schema, Transform, Vec3};

/// A schema 2 level
#[derive(Debug, Clone)]
pub struct TreeLevel {
    pub info: LevelInfo,
    graph: SceneGraph<TreeNode>,
    ids: IdAllocator,
}

impl TreeLevel {
    /// Level with the given header and no nodes
    pub fn with_info(info: LevelInfo) -> Self {
        Self {
            info,
            graph: SceneGraph::new(),
            ids: IdAllocator::new(),
        }
    }

    /// Depth-first search for a node id
    pub fn find_by_id(&self, node_id: i64) -> Option<NodeHandle> {
        self.graph.find(|n| n.node_id == node_id)
    }

    /// Id the next created node will get
    pub fn next_id(&self) -> i64 {
        self.ids.peek()
    }

    fn check_parent(&self, parent: Option<NodeHandle>) -> Result<(), EditError> {
        match parent.map(|p| self.graph.get(p)) {
            None => Ok(()),
            Some(None) => Err(EditError::StaleHandle),
            Some(Some(p)) if p.is_group() => Ok(()),
            Some(Some(_)) => Err(EditError::NotAGroup),
        }
    }

    /// Keep unique positive ids from the file, allocate the rest
    fn assign_ids(&mut self) {
        let order = self.graph.depth_first();
        let mut seen = HashSet::new();
        for &(h, _) in &order {
            if let Some(node) = self.graph.get_mut(h) {
                if node.node_id <= 0 || !seen.insert(node.node_id) {
                    if node.node_id > 0 {
                        warn!("duplicate node id {}; a new id will be assigned", node.node_id);
                    }
                    node.node_id = 0;
                }
            }
        }

        self.ids.recompute_from_tree(&self.graph);
        for (h, _) in order {
            if let Some(node) = self.graph.get_mut(h) {
                if node.node_id == 0 {
                    node.node_id = self.ids.next_id();
                }
            }
        }
    }

    fn add_default_scene(&mut self) -> Result<(), EditError> {
        let start = Transform::from_position(Vec3::new(0.0, 0.5, 0.0));
        self.add_node(TreeNodeType::Start, Some(start), None)?;
        let finish = Transform::from_position(Vec3::new(0.0, 5.0, 0.0));
        self.add_node(TreeNodeType::Finish, Some(finish), None)?;
        let ground = Transform::from_position_scale(Vec3::new(0.0, 0.0, -2.0), Vec3::new(10.0, 0.5, 10.0));
        self.add_node(TreeNodeType::Static, Some(ground), None)?;
        Ok(())
    }
}

impl LevelDocument for TreeLevel {
    type Node = TreeNode;
    type NodeType = TreeNodeType;

    const SCHEMA: Schema = Schema::Tree;

    fn new_default() -> Self {
        let mut level = Self::with_info(LevelInfo::defaults_for(Schema::Tree));
        if let Err(e) = level.add_default_scene() {
            warn!("could not build the default scene: {}", e);
        }
        level
    }

    fn from_json(value: &Value) -> Result<Self, LevelError> {
        let root = value
            .as_object()
            .ok_or_else(|| LevelError::NotALevel("top level is not an object".into()))?;

        let entries = match root.get("levelNodes") {
            None | Some(Value::Null) => &[][..],
            Some(Value::Array(items)) => items.as_slice(),
            Some(_) => return Err(LevelError::NotALevel("`levelNodes` is not a list".into())),
        };

        let mut level = Self::with_info(LevelInfo::from_json(root, Schema::Tree));
        for entry in entries {
            codec::from_dict(&mut level.graph, entry, None, 0);
        }
        level.assign_ids();
        debug!(
            "decoded {} tree nodes, next id {}",
            level.graph.len(),
            level.ids.peek()
        );
        Ok(level)
    }

    fn to_json(&self) -> Value {
        let nodes = self
            .graph
            .roots()
            .iter()
            .map(|&h| codec::to_dict(&self.graph, h))
            .collect();
        self.info.to_json(Schema::Tree, nodes)
    }

    fn info(&self) -> &LevelInfo {
        &self.info
    }

    fn info_mut(&mut self) -> &mut LevelInfo {
        &mut self.info
    }

    fn graph(&self) -> &SceneGraph<TreeNode> {
        &self.graph
    }

    fn node_mut(&mut self, handle: NodeHandle) -> Option<&mut TreeNode> {
        self.graph.get_mut(handle)
    }

    fn add_node(
        &mut self,
        node_type: TreeNodeType,
        placement: Option<Transform>,
        parent: Option<NodeHandle>,
    ) -> Result<NodeHandle, EditError> {
        self.check_parent(parent)?;
        let mut node = TreeNode::new(node_type, self.ids.next_id());
        if let Some(t) = placement {
            node.transform = t;
        }
        debug!("adding {} node {}", node_type.name(), node.node_id);
        self.graph.insert(node, parent)
    }

    fn duplicate_node(&mut self, handle: NodeHandle) -> Result<NodeHandle, EditError> {
        let copy = self.graph.clone_subtree(handle, None)?;
        for h in self.graph.subtree(copy) {
            if let Some(node) = self.graph.get_mut(h) {
                node.node_id = self.ids.next_id();
            }
        }
        if let Some(node) = self.graph.get_mut(copy) {
            node.transform.translate(DUPLICATE_OFFSET);
        }
        Ok(copy)
    }

    fn remove_node(&mut self, handle: NodeHandle) -> Result<usize, EditError> {
        let removed = self.graph.remove(handle)?;
        debug!("removed {} tree nodes", removed.len());
        Ok(removed.len())
    }

    fn node_label(&self, handle: NodeHandle) -> Option<String> {
        self.graph.get(handle).map(TreeNode::label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{EditableNode, PropertyKey, PropertyValue};
    use serde_json::json;

    fn grouped() -> Value {
        json!({
            "formatVersion": 1,
            "title": "Groups",
            "complexity": 4,
            "levelNodes": [
                { "id": 1, "parentId": 0, "Node": { "groupResponse": {
                    "childNodes": [
                        { "id": 2, "parentId": 1, "Node": { "staticResponse": { "shape": 1000 } } },
                        { "id": 3, "parentId": 1, "Node": { "staticResponse": { "shape": 1000 } } }
                    ]
                } } }
            ]
        })
    }

    fn all_ids(level: &TreeLevel) -> Vec<i64> {
        level
            .graph()
            .depth_first()
            .into_iter()
            .map(|(h, _)| level.graph().get(h).unwrap().node_id)
            .collect()
    }

    #[test]
    fn test_find_and_remove_group() {
        let mut level = TreeLevel::from_json(&grouped()).unwrap();
        let three = level.find_by_id(3).unwrap();
        let group = level.find_by_id(1).unwrap();
        assert_eq!(level.graph().parent(three), Some(group));
        assert_eq!(level.find_by_id(9), None);

        assert_eq!(level.remove_node(group).unwrap(), 3);
        assert!(level.graph().is_empty());
        assert_eq!(level.find_by_id(3), None);
    }

    #[test]
    fn test_ids_unique_after_duplication() {
        let mut level = TreeLevel::from_json(&grouped()).unwrap();
        let group = level.find_by_id(1).unwrap();
        let child = level.find_by_id(2).unwrap();
        level.duplicate_node(group).unwrap();
        level.duplicate_node(child).unwrap();

        let ids = all_ids(&level);
        assert_eq!(ids.len(), 7);
        let unique: HashSet<_> = ids.iter().collect();
        assert_eq!(unique.len(), 7);
    }

    #[test]
    fn test_duplicate_goes_to_root_with_offset() {
        let mut level = TreeLevel::from_json(&grouped()).unwrap();
        let child = level.find_by_id(2).unwrap();
        level
            .node_mut(child)
            .unwrap()
            .set_property(PropertyKey::Position, PropertyValue::Vector(Vec3::new(2.0, 3.0, 4.0)))
            .unwrap();

        let copy = level.duplicate_node(child).unwrap();
        assert_eq!(level.graph().parent(copy), None);
        let node = level.graph().get(copy).unwrap();
        assert_eq!(node.transform.position, Vec3::new(3.0, 4.0, 4.0));
        assert_eq!(node.node_id, 4);
        assert_eq!(level.to_json()["levelNodes"][1]["parentId"], json!(0));
    }

    #[test]
    fn test_duplicated_group_keeps_structure() {
        let mut level = TreeLevel::from_json(&grouped()).unwrap();
        let group = level.find_by_id(1).unwrap();
        let copy = level.duplicate_node(group).unwrap();
        let copy_id = level.graph().get(copy).unwrap().node_id;
        assert_eq!(level.graph().children(copy).len(), 2);

        let out = level.to_json();
        let children = out["levelNodes"][1]["Node"]["groupResponse"]["childNodes"]
            .as_array()
            .unwrap();
        assert!(children.iter().all(|c| c["parentId"] == json!(copy_id)));
    }

    #[test]
    fn test_start_save_load_idempotent() {
        let mut level = TreeLevel::with_info(LevelInfo::defaults_for(Schema::Tree));
        let placement = Transform::from_position(Vec3::new(0.0, 0.5, 0.0));
        level.add_node(TreeNodeType::Start, Some(placement), None).unwrap();

        let back = TreeLevel::from_json(&level.to_json()).unwrap();
        let h = back.graph().roots()[0];
        let node = back.graph().get(h).unwrap();
        assert_eq!(node.transform.position, Vec3::new(0.0, 0.5, 0.0));
        assert_eq!(node.kind, TreeKind::Start { radius: 0.5 });
    }

    #[test]
    fn test_default_scene() {
        let level = TreeLevel::new_default();
        assert_eq!(level.graph().len(), 3);
        assert_eq!(all_ids(&level), vec![1, 2, 3]);
        assert_eq!(level.next_id(), 4);
        let ground = level.graph().get(level.find_by_id(3).unwrap()).unwrap();
        assert_eq!(ground.transform.scale, Vec3::new(10.0, 0.5, 10.0));
    }

    #[test]
    fn test_children_only_under_groups() {
        let mut level = TreeLevel::from_json(&grouped()).unwrap();
        let group = level.find_by_id(1).unwrap();
        let leaf = level.find_by_id(2).unwrap();

        let added = level.add_node(TreeNodeType::Sign, None, Some(group)).unwrap();
        assert_eq!(level.graph().parent(added), Some(group));
        assert_eq!(level.graph().get(added).unwrap().node_id, 4);
        assert_eq!(
            level.add_node(TreeNodeType::Sign, None, Some(leaf)),
            Err(EditError::NotAGroup)
        );
    }

    #[test]
    fn test_missing_and_duplicate_ids_are_reassigned() {
        let value = json!({
            "levelNodes": [
                { "id": 5, "Node": { "startResponse": {} } },
                { "id": 5, "Node": { "finishResponse": {} } },
                { "Node": { "signResponse": {} } }
            ]
        });
        let level = TreeLevel::from_json(&value).unwrap();
        assert_eq!(all_ids(&level), vec![5, 6, 7]);
    }

    #[test]
    fn test_text_rejected_on_static() {
        let mut level = TreeLevel::from_json(&grouped()).unwrap();
        let h = level.find_by_id(2).unwrap();
        let before = level.graph().get(h).cloned();
        let result = level
            .node_mut(h)
            .unwrap()
            .set_property(PropertyKey::Text, PropertyValue::Text("x".into()));
        assert!(result.is_err());
        assert_eq!(level.graph().get(h).cloned(), before);
    }

    #[test]
    fn test_labels_are_indented() {
        let level = TreeLevel::from_json(&grouped()).unwrap();
        let labels: Vec<_> = level.node_labels().into_iter().map(|(_, l)| l).collect();
        assert_eq!(labels[0], "[ID: 1] Group (group)");
        assert_eq!(labels[1], "  [ID: 2] Static (cube, default)");
    }

    #[test]
    fn test_header_round_trip() {
        let level = TreeLevel::from_json(&grouped()).unwrap();
        let out = level.to_json();
        assert_eq!(out["complexity"], json!(4));
        assert_eq!(out["title"], json!("Groups"));
        assert!(out["ambienceSettings"].get("fogDDensity").is_some());
    }
}
