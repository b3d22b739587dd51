//! Field readers and writers for level JSON
//!
//! Level files are hand-edited and produced by several tools, so every reader
//! takes a default for a missing (or `null`) field. A field that is present
//! but has the wrong JSON type is reported as a [`FieldError`]; the codecs
//! decide whether that fails the node or just substitutes the default.

use log::warn;
use serde_json::{json, Map, Value};
use thiserror::Error;

use super::color::Color;
use super::math::{Quat, Vec3};

/// A JSON object (key order preserved)
pub type JsonObject = Map<String, Value>;

/// A field was present but could not be read as the expected type
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldError {
    #[error("field `{field}` should be {expected}, found {found}")]
    WrongType {
        field: String,
        expected: &'static str,
        found: &'static str,
    },
    #[error("expected a JSON object, found {found}")]
    NotAnObject { found: &'static str },
    #[error("node object has no type key")]
    MissingTypeKey,
}

impl FieldError {
    fn wrong_type(field: &str, expected: &'static str, found: &Value) -> Self {
        FieldError::WrongType {
            field: field.to_string(),
            expected,
            found: type_name(found),
        }
    }
}

/// JSON type name for diagnostics
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Borrow a value as an object
pub fn as_object(value: &Value) -> Result<&JsonObject, FieldError> {
    value.as_object().ok_or(FieldError::NotAnObject {
        found: type_name(value),
    })
}

fn present<'a>(obj: &'a JsonObject, key: &str) -> Option<&'a Value> {
    obj.get(key).filter(|v| !v.is_null())
}

/// Read a float. Numeric strings are accepted.
pub fn read_f64(obj: &JsonObject, key: &str, default: f64) -> Result<f64, FieldError> {
    let Some(value) = present(obj, key) else {
        return Ok(default);
    };
    match value {
        Value::Number(n) => n.as_f64().ok_or_else(|| FieldError::wrong_type(key, "a number", value)),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| FieldError::wrong_type(key, "a number", value)),
        _ => Err(FieldError::wrong_type(key, "a number", value)),
    }
}

/// Read an integer. Floats with no fractional part are accepted.
pub fn read_i64(obj: &JsonObject, key: &str, default: i64) -> Result<i64, FieldError> {
    let Some(value) = present(obj, key) else {
        return Ok(default);
    };
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(i)
            } else {
                match n.as_f64() {
                    Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Ok(f as i64),
                    _ => Err(FieldError::wrong_type(key, "an integer", value)),
                }
            }
        }
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| FieldError::wrong_type(key, "an integer", value)),
        _ => Err(FieldError::wrong_type(key, "an integer", value)),
    }
}

/// Read an enum code. Anything that is not an integer yields the default.
pub fn read_code(obj: &JsonObject, key: &str, default: i64) -> i64 {
    present(obj, key).and_then(Value::as_i64).unwrap_or(default)
}

/// Read a string; numbers and booleans are converted to their text form
pub fn read_string(obj: &JsonObject, key: &str, default: &str) -> Result<String, FieldError> {
    match present(obj, key) {
        None => Ok(default.to_string()),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(v @ (Value::Number(_) | Value::Bool(_))) => Ok(v.to_string()),
        Some(v) => Err(FieldError::wrong_type(key, "a string", v)),
    }
}

/// Read `{x, y, z}`; missing axes take the default's component
pub fn read_vec3(obj: &JsonObject, key: &str, default: Vec3) -> Result<Vec3, FieldError> {
    let Some(value) = present(obj, key) else {
        return Ok(default);
    };
    let v = value
        .as_object()
        .ok_or_else(|| FieldError::wrong_type(key, "an object", value))?;
    Ok(Vec3::new(
        read_f64(v, "x", default.x)?,
        read_f64(v, "y", default.y)?,
        read_f64(v, "z", default.z)?,
    ))
}

/// Read `{w, x, y, z}` as a unit quaternion; missing components take identity values
pub fn read_quat(obj: &JsonObject, key: &str) -> Result<Quat, FieldError> {
    let Some(value) = present(obj, key) else {
        return Ok(Quat::IDENTITY);
    };
    let q = value
        .as_object()
        .ok_or_else(|| FieldError::wrong_type(key, "an object", value))?;
    Ok(Quat::new(
        read_f64(q, "w", 1.0)?,
        read_f64(q, "x", 0.0)?,
        read_f64(q, "y", 0.0)?,
        read_f64(q, "z", 0.0)?,
    )
    .normalize())
}

/// Read `{r, g, b, a}`. Never fails: a value that is not an object gives the
/// default, and a bad channel takes the default's channel.
pub fn read_color(obj: &JsonObject, key: &str, default: Color) -> Color {
    match present(obj, key).and_then(Value::as_object) {
        Some(c) => Color::rgba(
            read_f64(c, "r", default.r).unwrap_or(default.r),
            read_f64(c, "g", default.g).unwrap_or(default.g),
            read_f64(c, "b", default.b).unwrap_or(default.b),
            read_f64(c, "a", default.a).unwrap_or(default.a),
        ),
        None => default,
    }
}

/// Unwrap a field read, substituting `default` (with a warning) when the field is malformed
pub fn or_warn<T>(result: Result<T, FieldError>, default: T, context: &str) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            warn!("{}: {}; using default", context, e);
            default
        }
    }
}

pub fn vec3_to_json(v: Vec3) -> Value {
    json!({ "x": v.x, "y": v.y, "z": v.z })
}

pub fn quat_to_json(q: Quat) -> Value {
    json!({ "w": q.w, "x": q.x, "y": q.y, "z": q.z })
}

pub fn color_to_json(c: Color) -> Value {
    json!({ "r": c.r, "g": c.g, "b": c.b, "a": c.a })
}

/// Euler angles (degrees) written as the on-disk quaternion
pub fn rotation_to_json(euler: Vec3) -> Value {
    quat_to_json(Quat::from_euler_degrees(euler))
}

/// Split `obj` into the keys in `owned` (dropped) and everything else (returned, order kept)
pub fn without_keys(obj: &JsonObject, owned: &[&str]) -> JsonObject {
    obj.iter()
        .filter(|(k, _)| !owned.contains(&k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}
