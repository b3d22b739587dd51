//! Level loading and saving
//!
//! Level files are JSON in one of two layouts:
//! - Schema 1 (flat): `levelNodes` is a list of `{ <typeTag>: {...}, color }`
//! - Schema 2 (tree): `levelNodes` is a list of `{ id, parentId, Node: {...} }`
//!   with groups nesting their children under `childNodes`
//!
//! Reading auto-detects the schema. Writing pretty-prints with a
//! configurable indent (four spaces by default, like the files the game ships).

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use serde_json::Value;
use thiserror::Error;

use crate::flat::FlatLevel;
use crate::scene::LevelDocument;
use crate::tree::TreeLevel;

/// Validation limits to keep hostile files from exhausting the stack or memory
pub mod limits {
    /// Maximum nesting depth of groups
    pub const MAX_GROUP_DEPTH: usize = 256;
    /// Maximum size of a level file in bytes
    pub const MAX_FILE_SIZE: u64 = 256 * 1024 * 1024;
}

/// Default indent width for written level files
pub const DEFAULT_INDENT: usize = 4;

/// Error type for level loading and saving
#[derive(Debug, Error)]
pub enum LevelError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("not a level document: {0}")]
    NotALevel(String),
    #[error("unknown schema `{0}` (expected `flat` or `tree`)")]
    UnknownSchema(String),
    #[error("level has not been saved yet; a file path is required")]
    NoCurrentFile,
}

impl LevelError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        LevelError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Which on-disk layout a level uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Schema {
    /// Schema 1: flat `levelNodes` with type-tagged keys
    #[default]
    Flat,
    /// Schema 2: `Node`-wrapped entries with ids and groups
    Tree,
}

impl Schema {
    /// Guess the schema of a parsed level document
    pub fn detect(root: &Value) -> Schema {
        let tree_node = root
            .get("levelNodes")
            .and_then(Value::as_array)
            .map(|nodes| nodes.iter().any(|n| n.get("Node").is_some()))
            .unwrap_or(false);
        let tree_fog = root
            .get("ambienceSettings")
            .and_then(|a| a.get("fogDDensity"))
            .is_some();
        if tree_node || tree_fog || root.get("complexity").is_some() {
            Schema::Tree
        } else {
            Schema::Flat
        }
    }

    /// Key used for fog density in this schema's ambience block
    pub fn fog_key(self) -> &'static str {
        match self {
            Schema::Flat => "fogDensity",
            Schema::Tree => "fogDDensity",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Schema::Flat => "flat",
            Schema::Tree => "tree",
        }
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Schema {
    type Err = LevelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "flat" | "1" | "schema1" => Ok(Schema::Flat),
            "tree" | "2" | "schema2" => Ok(Schema::Tree),
            other => Err(LevelError::UnknownSchema(other.to_string())),
        }
    }
}

/// A loaded level of either schema
#[derive(Debug, Clone)]
pub enum AnyLevel {
    Flat(FlatLevel),
    Tree(TreeLevel),
}

impl AnyLevel {
    pub fn schema(&self) -> Schema {
        match self {
            AnyLevel::Flat(_) => Schema::Flat,
            AnyLevel::Tree(_) => Schema::Tree,
        }
    }

    /// Empty (schema 1) or default-scene (schema 2) level
    pub fn new_default(schema: Schema) -> Self {
        match schema {
            Schema::Flat => AnyLevel::Flat(FlatLevel::new_default()),
            Schema::Tree => AnyLevel::Tree(TreeLevel::new_default()),
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            AnyLevel::Flat(level) => level.to_json(),
            AnyLevel::Tree(level) => level.to_json(),
        }
    }
}

/// Read and parse a JSON file
pub fn read_json(path: &Path) -> Result<Value, LevelError> {
    let meta = fs::metadata(path).map_err(|e| LevelError::io(path, e))?;
    if meta.len() > limits::MAX_FILE_SIZE {
        return Err(LevelError::NotALevel(format!(
            "file is {} bytes, limit is {}",
            meta.len(),
            limits::MAX_FILE_SIZE
        )));
    }
    let text = fs::read_to_string(path).map_err(|e| LevelError::io(path, e))?;
    Ok(serde_json::from_str(&text)?)
}

/// Parse a level from a JSON string, detecting the schema
pub fn parse_level_str(s: &str) -> Result<AnyLevel, LevelError> {
    let value: Value = serde_json::from_str(s)?;
    parse_level_value(&value)
}

/// Build a level from an already-parsed JSON document, detecting the schema
pub fn parse_level_value(value: &Value) -> Result<AnyLevel, LevelError> {
    match Schema::detect(value) {
        Schema::Flat => Ok(AnyLevel::Flat(FlatLevel::from_json(value)?)),
        Schema::Tree => Ok(AnyLevel::Tree(TreeLevel::from_json(value)?)),
    }
}

/// Load a level file of either schema
pub fn load_document<P: AsRef<Path>>(path: P) -> Result<AnyLevel, LevelError> {
    let path = path.as_ref();
    let value = read_json(path)?;
    let level = parse_level_value(&value)?;
    log::debug!("loaded {} level from {}", level.schema(), path.display());
    Ok(level)
}

/// Load a level file as a specific document type
pub fn load_as<D: LevelDocument, P: AsRef<Path>>(path: P) -> Result<D, LevelError> {
    let path = path.as_ref();
    let value = read_json(path)?;
    let found = Schema::detect(&value);
    if found != D::SCHEMA {
        log::warn!(
            "{} looks like a {} level, reading it as {}",
            path.display(),
            found,
            D::SCHEMA
        );
    }
    D::from_json(&value)
}

/// Pretty-print a JSON value with `indent` spaces per level
pub fn serialize_level(value: &Value, indent: usize) -> Result<String, LevelError> {
    let indent_bytes = vec![b' '; indent];
    let mut out = Vec::new();
    let formatter = PrettyFormatter::with_indent(&indent_bytes);
    let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
    value.serialize(&mut ser)?;
    String::from_utf8(out).map_err(|e| LevelError::NotALevel(e.to_string()))
}

/// Write a JSON value to a file. The in-memory value is never touched,
/// so a failed write leaves the caller's state as it was.
pub fn save_json<P: AsRef<Path>>(value: &Value, path: P, indent: usize) -> Result<(), LevelError> {
    let path = path.as_ref();
    let text = serialize_level(value, indent)?;
    fs::write(path, text).map_err(|e| LevelError::io(path, e))?;
    log::debug!("wrote level to {}", path.display());
    Ok(())
}

/// Serialize a document and write it
pub fn save_document<D: LevelDocument, P: AsRef<Path>>(
    doc: &D,
    path: P,
    indent: usize,
) -> Result<(), LevelError> {
    save_json(&doc.to_json(), path, indent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_detect_flat() {
        let v = json!({
            "formatVersion": 12,
            "levelNodes": [{ "levelNodeStatic": {} }],
            "ambienceSettings": { "fogDensity": 0.0 }
        });
        assert_eq!(Schema::detect(&v), Schema::Flat);
    }

    #[test]
    fn test_detect_tree() {
        let by_node = json!({ "levelNodes": [{ "id": 1, "parentId": 0, "Node": {} }] });
        let by_fog = json!({ "levelNodes": [], "ambienceSettings": { "fogDDensity": 0.0 } });
        let by_complexity = json!({ "complexity": 3, "levelNodes": [] });
        assert_eq!(Schema::detect(&by_node), Schema::Tree);
        assert_eq!(Schema::detect(&by_fog), Schema::Tree);
        assert_eq!(Schema::detect(&by_complexity), Schema::Tree);
    }

    #[test]
    fn test_schema_from_str() {
        assert_eq!("flat".parse::<Schema>().unwrap(), Schema::Flat);
        assert_eq!("Tree".parse::<Schema>().unwrap(), Schema::Tree);
        assert!(matches!("xml".parse::<Schema>(), Err(LevelError::UnknownSchema(_))));
    }

    #[test]
    fn test_serialize_uses_indent() {
        let text = serialize_level(&json!({ "a": 1 }), 4).unwrap();
        assert_eq!(text, "{\n    \"a\": 1\n}");
    }

    #[test]
    fn test_save_and_load_flat_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("level.json");

        let level = AnyLevel::new_default(Schema::Flat);
        save_json(&level.to_json(), &path, DEFAULT_INDENT).unwrap();

        let loaded = load_document(&path).unwrap();
        assert_eq!(loaded.schema(), Schema::Flat);
    }

    #[test]
    fn test_save_and_load_tree_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tree.json");

        let level = AnyLevel::new_default(Schema::Tree);
        save_json(&level.to_json(), &path, DEFAULT_INDENT).unwrap();

        match load_document(&path).unwrap() {
            AnyLevel::Tree(tree) => assert_eq!(tree.graph().len(), 3),
            AnyLevel::Flat(_) => panic!("expected a tree level"),
        }
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = load_document(dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, LevelError::Io { .. }));
    }

    #[test]
    fn test_invalid_json_is_reported() {
        assert!(matches!(parse_level_str("{ not json"), Err(LevelError::Json(_))));
    }

    #[test]
    fn test_non_object_root_is_not_a_level() {
        assert!(matches!(parse_level_str("[1, 2]"), Err(LevelError::NotALevel(_))));
    }
}
