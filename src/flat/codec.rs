//! Schema 1 node codec
//!
//! Entry shape: `{ <typeTag>: { position, rotation, ...variant fields, ...raw }, color }`.
//!
//! Decoding never fails a level: an entry that cannot be decoded is replaced
//! by a default node and a warning is logged, so the rest of the file stays
//! loadable.

use log::warn;
use serde_json::{Map, Value};

use super::node::{FlatKind, FlatMaterial, FlatNode, FlatNodeType};
use crate::world::json::{
    as_object, color_to_json, or_warn, read_code, read_color, read_f64, read_i64, read_quat,
    read_string, read_vec3, rotation_to_json, vec3_to_json, without_keys, FieldError, JsonObject,
};
use crate::world::{Color, Quat, Shape, Transform, Vec3};

/// Decode one `levelNodes` entry, substituting a default node on error
pub fn from_json(entry: &Value) -> FlatNode {
    match try_from_json(entry) {
        Ok(node) => node,
        Err(e) => {
            warn!("malformed level node ({}); replaced with a default node", e);
            FlatNode::default()
        }
    }
}

/// Decode one `levelNodes` entry
pub fn try_from_json(entry: &Value) -> Result<FlatNode, FieldError> {
    let obj = as_object(entry)?;
    let (tag, nested) = obj
        .iter()
        .find(|(k, _)| k.as_str() != "color")
        .ok_or(FieldError::MissingTypeKey)?;

    let empty = JsonObject::new();
    let nested = match nested {
        Value::Null => &empty,
        other => as_object(other)?,
    };

    let kind = match FlatNodeType::from_tag(tag) {
        Some(FlatNodeType::Static) => FlatKind::Static {
            shape: Shape::from_code(read_code(nested, "shape", Shape::Cube.code())),
            material: FlatMaterial::from_code(read_code(nested, "material", FlatMaterial::Default.code())),
            color1: read_color(nested, "color1", Color::WHITE),
        },
        Some(FlatNodeType::Sign) => FlatKind::Sign {
            text: read_string(nested, "text", "")?,
        },
        Some(FlatNodeType::Start) => FlatKind::Start {
            radius: read_f64(nested, "radius", 1.0)?,
        },
        Some(FlatNodeType::Finish) => FlatKind::Finish {
            radius: read_f64(nested, "radius", 1.0)?,
        },
        Some(FlatNodeType::Gravity) => FlatKind::Gravity {
            mode: read_i64(nested, "mode", 0)?,
        },
        Some(FlatNodeType::ParticleEmitter) => FlatKind::ParticleEmitter,
        Some(FlatNodeType::Trigger) => FlatKind::Trigger,
        Some(FlatNodeType::Sound) => FlatKind::Sound,
        None => {
            warn!("unknown node type `{}`; keeping it as raw data", tag);
            FlatKind::Unknown { tag: tag.clone() }
        }
    };

    let transform = Transform {
        position: read_vec3(nested, "position", Vec3::ZERO)?,
        rotation: or_warn(read_quat(nested, "rotation"), Quat::IDENTITY, tag).to_euler_degrees(),
        scale: read_vec3(nested, "scale", Vec3::ONE)?,
    };

    let default_id = format!("node_{}", tag);
    let id = or_warn(read_string(nested, "id", &default_id), default_id.clone(), tag);

    Ok(FlatNode {
        id,
        raw_data: without_keys(nested, kind.owned_keys()),
        kind,
        transform,
        color: read_color(obj, "color", Color::BLACK),
    })
}

/// Encode a node as a `levelNodes` entry
pub fn to_json(node: &FlatNode) -> Value {
    let t = &node.transform;

    // Unknown keys first so they keep their place in the file
    let mut nested = node.raw_data.clone();
    nested.insert("position".into(), vec3_to_json(t.position));
    nested.insert("rotation".into(), rotation_to_json(t.rotation));

    match &node.kind {
        FlatKind::Static { shape, material, color1 } => {
            nested.insert("shape".into(), shape.code().into());
            nested.insert("material".into(), material.code().into());
            nested.insert("scale".into(), vec3_to_json(t.scale));
            nested.insert("color1".into(), color_to_json(*color1));
        }
        FlatKind::Start { radius } | FlatKind::Finish { radius } => {
            nested.insert("radius".into(), (*radius).into());
        }
        FlatKind::Sign { text } => {
            nested.insert("text".into(), text.clone().into());
        }
        FlatKind::Gravity { mode } => {
            nested.insert("mode".into(), (*mode).into());
        }
        FlatKind::ParticleEmitter | FlatKind::Trigger | FlatKind::Sound | FlatKind::Unknown { .. } => {}
    }

    // Only written back when the file already had them
    if nested.contains_key("scale") {
        nested.insert("scale".into(), vec3_to_json(t.scale));
    }
    if nested.contains_key("id") {
        nested.insert("id".into(), node.id.clone().into());
    }

    let mut entry = Map::new();
    entry.insert(node.tag().to_string(), Value::Object(nested));
    entry.insert("color".into(), color_to_json(node.color));
    Value::Object(entry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a.x - b.x).abs() < 1e-6 && (a.y - b.y).abs() < 1e-6 && (a.z - b.z).abs() < 1e-6
    }

    #[test]
    fn test_empty_static_defaults() {
        let node = try_from_json(&json!({ "levelNodeStatic": {} })).unwrap();
        assert_eq!(
            node.kind,
            FlatKind::Static {
                shape: Shape::Cube,
                material: FlatMaterial::Default,
                color1: Color::WHITE,
            }
        );
        assert_eq!(node.transform.position, Vec3::ZERO);
        assert_eq!(node.transform.scale, Vec3::ONE);
        assert_eq!(node.color, Color::BLACK);
        assert_eq!(node.id, "node_levelNodeStatic");
        assert!(node.raw_data.is_empty());
    }

    #[test]
    fn test_unknown_keys_survive_round_trip() {
        let entry = json!({
            "levelNodeStatic": {
                "position": { "x": 1.0, "y": 2.0, "z": 3.0 },
                "rotation": { "w": 1.0, "x": 0.0, "y": 0.0, "z": 0.0 },
                "shape": 1001,
                "material": 4,
                "isNeon": true,
                "animations": [{ "name": "spin", "frames": [] }]
            },
            "color": { "r": 0.1, "g": 0.2, "b": 0.3, "a": 1.0 }
        });
        let node = from_json(&entry);
        let out = to_json(&node);
        let nested = &out["levelNodeStatic"];
        assert_eq!(nested["isNeon"], json!(true));
        assert_eq!(nested["animations"], json!([{ "name": "spin", "frames": [] }]));
        assert_eq!(nested["shape"], json!(1001));
        assert_eq!(nested["material"], json!(4));
        assert_eq!(out["color"]["g"], json!(0.2));
    }

    #[test]
    fn test_rotation_is_persisted() {
        let mut node = FlatNode::new(FlatNodeType::Static, "s");
        node.transform.rotation = Vec3::new(0.0, 90.0, 0.0);
        let back = from_json(&to_json(&node));
        assert!(approx(back.transform.rotation, Vec3::new(0.0, 90.0, 0.0)));
    }

    #[test]
    fn test_scale_written_back_only_when_present() {
        let without = from_json(&json!({ "levelNodeSign": { "text": "hi" } }));
        assert!(to_json(&without)["levelNodeSign"].get("scale").is_none());

        let mut with = from_json(&json!({
            "levelNodeTrigger": { "scale": { "x": 2.0, "y": 2.0, "z": 2.0 } }
        }));
        with.transform.scale = Vec3::new(5.0, 5.0, 5.0);
        assert_eq!(to_json(&with)["levelNodeTrigger"]["scale"]["x"], json!(5.0));
    }

    #[test]
    fn test_fields_of_other_variants_are_dropped() {
        let node = from_json(&json!({
            "levelNodeSign": {
                "text": "x",
                "material": 3,
                "shape": 1002,
                "radius": 9.0,
                "color1": { "r": 1 },
                "note": "kept"
            }
        }));
        assert_eq!(node.kind, FlatKind::Sign { text: "x".into() });
        let out = to_json(&node);
        let nested = out["levelNodeSign"].as_object().unwrap();
        for key in ["material", "shape", "radius", "color1", "mode"] {
            assert!(!nested.contains_key(key), "{} should not be written", key);
        }
        assert_eq!(nested["note"], json!("kept"));
    }

    #[test]
    fn test_bad_rotation_or_id_keeps_node() {
        let node = from_json(&json!({
            "levelNodeStatic": {
                "rotation": [0, 0, 0, 1],
                "id": { "n": 1 },
                "shape": 1001,
                "material": 4,
                "extraKey": 1
            }
        }));
        assert_eq!(node.transform.rotation, Vec3::ZERO);
        assert_eq!(node.id, "node_levelNodeStatic");
        assert!(matches!(
            node.kind,
            FlatKind::Static { shape: Shape::Sphere, material, .. } if material.code() == 4
        ));
        assert_eq!(node.raw_data.get("extraKey"), Some(&json!(1)));
    }

    #[test]
    fn test_gravity_mode_is_written() {
        let node = from_json(&json!({ "levelNodeGravity": { "mode": 2 } }));
        assert_eq!(to_json(&node)["levelNodeGravity"]["mode"], json!(2));
    }

    #[test]
    fn test_file_id_is_kept_and_edited() {
        let mut node = from_json(&json!({ "levelNodeStart": { "id": "spawn", "radius": 2.0 } }));
        assert_eq!(node.id, "spawn");
        assert_eq!(node.kind, FlatKind::Start { radius: 2.0 });
        node.id = "spawn2".into();
        assert_eq!(to_json(&node)["levelNodeStart"]["id"], json!("spawn2"));

        let fresh = FlatNode::new(FlatNodeType::Start, "levelNodeStart_0");
        assert!(to_json(&fresh)["levelNodeStart"].get("id").is_none());
    }

    #[test]
    fn test_unknown_tag_round_trips() {
        let entry = json!({ "levelNodeCustom": { "foo": 1, "position": { "x": 1.0 } } });
        let node = from_json(&entry);
        assert_eq!(node.kind, FlatKind::Unknown { tag: "levelNodeCustom".into() });
        let out = to_json(&node);
        assert_eq!(out["levelNodeCustom"]["foo"], json!(1));
        assert_eq!(out["levelNodeCustom"]["position"]["x"], json!(1.0));
    }

    #[test]
    fn test_malformed_node_becomes_default() {
        let node = from_json(&json!({ "levelNodeStart": { "radius": "huge" } }));
        assert_eq!(node, FlatNode::default());

        let node = from_json(&json!({ "levelNodeStatic": 5 }));
        assert_eq!(node, FlatNode::default());

        let node = from_json(&json!({}));
        assert_eq!(node, FlatNode::default());
    }

    #[test]
    fn test_bad_shape_code_defaults() {
        let node = from_json(&json!({ "levelNodeStatic": { "shape": "round", "material": 99 } }));
        match node.kind {
            FlatKind::Static { shape, material, .. } => {
                assert_eq!(shape, Shape::Cube);
                assert_eq!(material, FlatMaterial::Unknown(99));
            }
            other => panic!("unexpected kind {:?}", other),
        }
    }

    #[test]
    fn test_non_mapping_colors_fall_back() {
        let node = from_json(&json!({
            "levelNodeStatic": { "color1": "white" },
            "color": 7
        }));
        assert_eq!(node.color, Color::BLACK);
        assert!(matches!(node.kind, FlatKind::Static { color1, .. } if color1 == Color::WHITE));
    }
}
