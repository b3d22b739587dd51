//! Schema 2 node codec
//!
//! Entry shape: `{ id, parentId, Node: { <variantKey>: { ...fields } } }`.
//! Groups nest their children under `childNodes`.
//!
//! Decoding is field-level fail-soft: a malformed field takes its default and
//! a warning is logged. An entry that is not an object, or names an unknown
//! variant, becomes a default Static node.

use log::warn;
use serde_json::{json, Map, Value};

use super::node::{TreeKind, TreeMaterial, TreeNode, TreeNodeType, DEFAULT_SIGN_TEXT};
use crate::scene::{NodeHandle, SceneGraph};
use crate::world::json::{
    color_to_json, or_warn, read_code, read_color, read_f64, read_i64, read_quat, read_string,
    read_vec3, rotation_to_json, vec3_to_json, without_keys, JsonObject,
};
use crate::world::limits::MAX_GROUP_DEPTH;
use crate::world::{Color, Quat, Shape, Transform, Vec3};

/// Content keys the codec reads for some variant; never kept in `extra`
pub const OWNED_KEYS: &[&str] = &[
    "position",
    "rotation",
    "scale",
    "shape",
    "material",
    "color",
    "radius",
    "text",
    "stableTime",
    "respawnTime",
    "childNodes",
];

/// Decode one `levelNodes` entry (and its children) into `graph`.
///
/// The file's `id` is stored as-is; the caller validates ids once the whole
/// tree is loaded. Returns `None` only when `parent` is not a group.
pub fn from_dict(
    graph: &mut SceneGraph<TreeNode>,
    entry: &Value,
    parent: Option<NodeHandle>,
    depth: usize,
) -> Option<NodeHandle> {
    let Some(obj) = entry.as_object() else {
        warn!("level node is not an object; replaced with a default node");
        return graph.insert(TreeNode::new(TreeNodeType::Static, 0), parent).ok();
    };

    let node_id = or_warn(read_i64(obj, "id", 0), 0, "node id");
    let (node, children) = decode_node(obj, node_id);
    let handle = graph.insert(node, parent).ok()?;

    if let Some(children) = children {
        if depth + 1 >= MAX_GROUP_DEPTH {
            warn!(
                "group {} is nested deeper than {} levels; its children were dropped",
                node_id, MAX_GROUP_DEPTH
            );
        } else {
            for child in children {
                from_dict(graph, child, Some(handle), depth + 1);
            }
        }
    }
    Some(handle)
}

fn decode_node(obj: &JsonObject, node_id: i64) -> (TreeNode, Option<&Vec<Value>>) {
    let variant = obj.get("Node").and_then(Value::as_object).and_then(|n| n.iter().next());
    let Some((key, raw)) = variant else {
        warn!("node {} has no `Node` variant; replaced with a default node", node_id);
        return (TreeNode::new(TreeNodeType::Static, node_id), None);
    };
    let Some(node_type) = TreeNodeType::from_variant_key(key) else {
        warn!("node {} has unknown variant `{}`; replaced with a default node", node_id, key);
        return (TreeNode::new(TreeNodeType::Static, node_id), None);
    };

    let empty = JsonObject::new();
    let content = match raw {
        Value::Object(c) => c,
        Value::Null => &empty,
        other => {
            warn!("node {} content is not an object ({}); using defaults", node_id, other);
            &empty
        }
    };

    let ctx = format!("node {}", node_id);
    let shape = || Shape::from_code(read_code(content, "shape", Shape::Cube.code()));
    let number = |key: &str, default: f64| or_warn(read_f64(content, key, default), default, &ctx);

    let kind = match node_type {
        TreeNodeType::Static => TreeKind::Static {
            shape: shape(),
            material: TreeMaterial::from_code(read_code(content, "material", TreeMaterial::Default.code())),
            color: read_color(content, "color", Color::WHITE),
        },
        TreeNodeType::Start => TreeKind::Start {
            radius: number("radius", 0.5),
        },
        TreeNodeType::Finish => TreeKind::Finish {
            radius: number("radius", 0.5),
        },
        TreeNodeType::Crumbling => TreeKind::Crumbling {
            shape: shape(),
            stable_time: number("stableTime", 1.0),
            respawn_time: number("respawnTime", 5.0),
        },
        TreeNodeType::Sign => TreeKind::Sign {
            shape: shape(),
            text: or_warn(
                read_string(content, "text", DEFAULT_SIGN_TEXT),
                DEFAULT_SIGN_TEXT.to_string(),
                &ctx,
            ),
            color: read_color(content, "color", Color::WHITE),
        },
        TreeNodeType::Group => TreeKind::Group,
    };

    let transform = Transform {
        position: or_warn(read_vec3(content, "position", Vec3::ZERO), Vec3::ZERO, &ctx),
        rotation: or_warn(read_quat(content, "rotation"), Quat::IDENTITY, &ctx).to_euler_degrees(),
        scale: or_warn(read_vec3(content, "scale", Vec3::ONE), Vec3::ONE, &ctx),
    };

    let children = match raw.get("childNodes") {
        _ if node_type != TreeNodeType::Group => None,
        None | Some(Value::Null) => None,
        Some(Value::Array(items)) => Some(items),
        Some(other) => {
            warn!("group {} `childNodes` is not a list ({}); ignored", node_id, other);
            None
        }
    };

    let node = TreeNode {
        node_id,
        kind,
        transform,
        extra: without_keys(content, OWNED_KEYS),
    };
    (node, children)
}

/// Encode a node and its subtree as a `levelNodes` entry
pub fn to_dict(graph: &SceneGraph<TreeNode>, handle: NodeHandle) -> Value {
    let Some(node) = graph.get(handle) else {
        return Value::Null;
    };
    let parent_id = graph
        .parent(handle)
        .and_then(|p| graph.get(p))
        .map_or(0, |p| p.node_id);

    let t = &node.transform;
    let mut content = Map::new();
    let mut put = |key: &str, value: Value| {
        content.insert(key.to_string(), value);
    };

    match &node.kind {
        TreeKind::Start { radius } => {
            put("position", vec3_to_json(t.position));
            put("rotation", rotation_to_json(t.rotation));
            put("radius", json!(radius));
        }
        TreeKind::Finish { radius } => {
            put("position", vec3_to_json(t.position));
            put("radius", json!(radius));
        }
        TreeKind::Static { shape, material, color } => {
            put("shape", json!(shape.code()));
            put("material", json!(material.code()));
            put("position", vec3_to_json(t.position));
            put("scale", vec3_to_json(t.scale));
            put("rotation", rotation_to_json(t.rotation));
            put("color", color_to_json(*color));
        }
        TreeKind::Crumbling { shape, stable_time, respawn_time } => {
            put("shape", json!(shape.code()));
            put("material", json!(TreeMaterial::Crumbling.code()));
            put("position", vec3_to_json(t.position));
            put("scale", vec3_to_json(t.scale));
            put("rotation", rotation_to_json(t.rotation));
            put("stableTime", json!(stable_time));
            put("respawnTime", json!(respawn_time));
        }
        TreeKind::Sign { shape, text, color } => {
            put("shape", json!(shape.code()));
            put("position", vec3_to_json(t.position));
            put("scale", vec3_to_json(t.scale));
            put("rotation", rotation_to_json(t.rotation));
            put("color", color_to_json(*color));
            put("text", json!(text));
        }
        TreeKind::Group => {
            put("position", vec3_to_json(t.position));
            put("rotation", rotation_to_json(t.rotation));
            put("scale", vec3_to_json(t.scale));
            let children = graph.children(handle).iter().map(|&c| to_dict(graph, c)).collect();
            put("childNodes", Value::Array(children));
        }
    }

    for (key, value) in &node.extra {
        content.entry(key.clone()).or_insert_with(|| value.clone());
    }

    let mut variant = Map::new();
    variant.insert(node.node_type().variant_key().to_string(), Value::Object(content));

    json!({
        "id": node.node_id,
        "parentId": parent_id,
        "Node": Value::Object(variant),
    })
}
