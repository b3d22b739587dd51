//! Flat level schema (schema 1)
//!
//! `levelNodes` is an ordered list of type-tagged entries with no hierarchy.
//! Nodes carry a free-form display id; new and duplicated nodes are named
//! `<typeTag>_<count>` after the number of nodes present before insertion.

pub mod codec;
mod node;

pub use node::*;

use serde_json::Value;

use crate::scene::{
    EditError, LevelDocument, NodeHandle, SceneGraph, DUPLICATE_OFFSET,
};
use crate::world::{LevelError, LevelInfo, Schema, Transform};

/// A schema 1 level
#[derive(Debug, Clone)]
pub struct FlatLevel {
    pub info: LevelInfo,
    graph: SceneGraph<FlatNode>,
}

impl FlatLevel {
    /// Level with the given header and no nodes
    pub fn with_info(info: LevelInfo) -> Self {
        Self {
            info,
            graph: SceneGraph::new(),
        }
    }

    /// Nodes in file order
    pub fn nodes(&self) -> impl Iterator<Item = (NodeHandle, &FlatNode)> {
        self.graph
            .roots()
            .iter()
            .filter_map(|&h| self.graph.get(h).map(|n| (h, n)))
    }

    /// Append an already-built node
    pub fn push(&mut self, node: FlatNode) -> NodeHandle {
        self.graph.push_root(node)
    }

    fn next_display_id(&self, tag: &str) -> String {
        format!("{}_{}", tag, self.graph.len())
    }

    fn check_parent(&self, parent: Option<NodeHandle>) -> Result<(), EditError> {
        match parent {
            None => Ok(()),
            Some(p) if self.graph.contains(p) => Err(EditError::NotAGroup),
            Some(_) => Err(EditError::StaleHandle),
        }
    }
}

impl LevelDocument for FlatLevel {
    type Node = FlatNode;
    type NodeType = FlatNodeType;

    const SCHEMA: Schema = Schema::Flat;

    fn new_default() -> Self {
        Self::with_info(LevelInfo::defaults_for(Schema::Flat))
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

        let mut level = Self::with_info(LevelInfo::from_json(root, Schema::Flat));
        for entry in entries {
            level.push(codec::from_json(entry));
        }
        log::debug!("decoded {} flat nodes", level.graph.len());
        Ok(level)
    }

    fn to_json(&self) -> Value {
        let nodes = self.nodes().map(|(_, n)| codec::to_json(n)).collect();
        self.info.to_json(Schema::Flat, nodes)
    }

    fn info(&self) -> &LevelInfo {
        &self.info
    }

    fn info_mut(&mut self) -> &mut LevelInfo {
        &mut self.info
    }

    fn graph(&self) -> &SceneGraph<FlatNode> {
        &self.graph
    }

    fn node_mut(&mut self, handle: NodeHandle) -> Option<&mut FlatNode> {
        self.graph.get_mut(handle)
    }

    fn add_node(
        &mut self,
        node_type: FlatNodeType,
        placement: Option<Transform>,
        parent: Option<NodeHandle>,
    ) -> Result<NodeHandle, EditError> {
        self.check_parent(parent)?;
        let mut node = FlatNode::new(node_type, self.next_display_id(node_type.tag()));
        if let Some(t) = placement {
            node.transform = t;
        }
        Ok(self.push(node))
    }

    fn duplicate_node(&mut self, handle: NodeHandle) -> Result<NodeHandle, EditError> {
        let mut copy = self.graph.get(handle).cloned().ok_or(EditError::StaleHandle)?;
        copy.id = self.next_display_id(copy.tag());
        copy.transform.translate(DUPLICATE_OFFSET);
        Ok(self.push(copy))
    }

    fn remove_node(&mut self, handle: NodeHandle) -> Result<usize, EditError> {
        Ok(self.graph.remove(handle)?.len())
    }

    fn node_label(&self, handle: NodeHandle) -> Option<String> {
        self.graph.get(handle).map(FlatNode::label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::Vec3;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "formatVersion": 12,
            "title": "Sample",
            "creators": "me",
            "description": "d",
            "tags": ["a", "b"],
            "maxCheckpointCount": 3,
            "ambienceSettings": { "sunAltitude": 30, "fogDensity": 0.1 },
            "levelNodes": [
                { "levelNodeStart": { "position": { "x": 0.0, "y": 1.0, "z": 0.0 }, "radius": 1.0 } },
                { "levelNodeStatic": { "position": { "x": 2.0, "y": 3.0, "z": 4.0 }, "shape": 1000 },
                  "color": { "r": 0.0, "g": 0.0, "b": 0.0, "a": 1.0 } },
                { "levelNodeFinish": {} }
            ],
            "editorVersion": "x"
        })
    }

    #[test]
    fn test_load_keeps_order_and_header() {
        let level = FlatLevel::from_json(&sample()).unwrap();
        let tags: Vec<_> = level.nodes().map(|(_, n)| n.tag().to_string()).collect();
        assert_eq!(tags, vec!["levelNodeStart", "levelNodeStatic", "levelNodeFinish"]);
        assert_eq!(level.info.title, "Sample");
        assert_eq!(level.info.tags, Some(vec!["a".to_string(), "b".to_string()]));
        assert_eq!(level.info.max_checkpoint_count, 3);
        assert_eq!(level.info.ambience.sun_altitude, 30.0);
    }

    #[test]
    fn test_save_keeps_unknown_top_level_keys() {
        let level = FlatLevel::from_json(&sample()).unwrap();
        let out = level.to_json();
        assert_eq!(out["editorVersion"], json!("x"));
        assert_eq!(out["levelNodes"].as_array().unwrap().len(), 3);
        assert_eq!(out["ambienceSettings"]["fogDensity"], json!(0.1));
    }

    #[test]
    fn test_add_names_by_count() {
        let mut level = FlatLevel::from_json(&sample()).unwrap();
        let h = level.add_node(FlatNodeType::Sign, None, None).unwrap();
        let node = level.graph().get(h).unwrap();
        assert_eq!(node.id, "levelNodeSign_3");
        assert_eq!(node.kind, FlatKind::Sign { text: String::new() });
        assert_eq!(level.graph().roots().last(), Some(&h));
    }

    #[test]
    fn test_duplicate_offsets_position() {
        let mut level = FlatLevel::from_json(&sample()).unwrap();
        let (static_handle, _) = level.nodes().nth(1).unwrap();

        let copy = level.duplicate_node(static_handle).unwrap();
        assert_ne!(copy, static_handle);
        let node = level.graph().get(copy).unwrap();
        assert_eq!(node.transform.position, Vec3::new(3.0, 4.0, 4.0));
        assert_eq!(node.id, "levelNodeStatic_3");
        assert_eq!(level.graph().len(), 4);
        // Original untouched
        let original = level.graph().get(static_handle).unwrap();
        assert_eq!(original.transform.position, Vec3::new(2.0, 3.0, 4.0));
    }

    #[test]
    fn test_remove_and_stale_handle() {
        let mut level = FlatLevel::from_json(&sample()).unwrap();
        let (first, _) = level.nodes().next().unwrap();
        assert_eq!(level.remove_node(first).unwrap(), 1);
        assert_eq!(level.graph().len(), 2);
        assert_eq!(level.remove_node(first), Err(EditError::StaleHandle));
    }

    #[test]
    fn test_flat_nodes_have_no_children() {
        let mut level = FlatLevel::new_default();
        let h = level.add_node(FlatNodeType::Static, None, None).unwrap();
        assert_eq!(
            level.add_node(FlatNodeType::Static, None, Some(h)),
            Err(EditError::NotAGroup)
        );
    }

    #[test]
    fn test_labels() {
        let level = FlatLevel::from_json(&sample()).unwrap();
        let labels: Vec<_> = level.node_labels().into_iter().map(|(_, l)| l).collect();
        assert_eq!(labels[0], "node_levelNodeStart (levelNodeStart)");
    }

    #[test]
    fn test_bad_node_does_not_abort_load() {
        let value = json!({
            "levelNodes": [
                { "levelNodeStart": { "radius": [] } },
                { "levelNodeFinish": { "radius": 2.0 } }
            ]
        });
        let level = FlatLevel::from_json(&value).unwrap();
        let kinds: Vec<_> = level.nodes().map(|(_, n)| n.kind.clone()).collect();
        assert_eq!(kinds[1], FlatKind::Finish { radius: 2.0 });
        assert_eq!(kinds.len(), 2);
    }

    #[test]
    fn test_non_list_nodes_is_not_a_level() {
        let value = json!({ "levelNodes": { "a": 1 } });
        assert!(matches!(FlatLevel::from_json(&value), Err(LevelError::NotALevel(_))));
    }
}
