//! Editor configuration
//!
//! Stored as RON in the platform config directory
//! (`<config_dir>/grab-level-editor/config.ron`). A missing file gives the
//! defaults; a file that cannot be read or parsed is reported and ignored.

use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::world::{Schema, DEFAULT_INDENT};

/// How many recently opened files are remembered
pub const MAX_RECENT_FILES: usize = 10;

const APP_DIR: &str = "grab-level-editor";
const CONFIG_FILE: &str = "config.ron";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no config directory on this platform")]
    NoConfigDir,
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("could not serialize config: {0}")]
    Serialize(#[from] ron::Error),
}

/// Persisted editor settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Working folder for schema 1 levels
    pub project_root: Option<PathBuf>,
    /// Schema used by `new` when none is given
    pub default_schema: Schema,
    /// Spaces per indent level in saved files
    pub indent: usize,
    /// Most recent first
    pub recent_files: Vec<PathBuf>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            project_root: None,
            default_schema: Schema::Flat,
            indent: DEFAULT_INDENT,
            recent_files: Vec::new(),
        }
    }
}

impl EditorConfig {
    /// `<config_dir>/grab-level-editor/config.ron`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR).join(CONFIG_FILE))
    }

    /// Load from the default location, falling back to defaults
    pub fn load() -> Self {
        match Self::default_path() {
            Some(path) => Self::load_or_default(&path),
            None => {
                warn!("no config directory; using default settings");
                Self::default()
            }
        }
    }

    /// Load from `path`; a missing or broken file gives the defaults
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(path) {
            Ok(config) => config,
            Err(e) => {
                warn!("ignoring config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: EditorConfig = ron::from_str(&contents)?;
        config.recent_files.truncate(MAX_RECENT_FILES);
        debug!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn save(&self) -> Result<PathBuf, ConfigError> {
        let path = Self::default_path().ok_or(ConfigError::NoConfigDir)?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Write as pretty RON, creating the parent directory
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .indentor("  ".to_string());
        let text = ron::ser::to_string_pretty(self, pretty)?;
        std::fs::write(path, text).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("saved config to {}", path.display());
        Ok(())
    }

    /// Move `path` to the front of the recent list
    pub fn push_recent(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        self.recent_files.retain(|p| *p != path);
        self.recent_files.insert(0, path);
        self.recent_files.truncate(MAX_RECENT_FILES);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("nested").join("config.ron");

        let mut config = EditorConfig::default();
        config.project_root = Some(PathBuf::from("/levels"));
        config.default_schema = Schema::Tree;
        config.indent = 2;
        config.push_recent("a.json");
        config.save_to(&path).unwrap();

        assert_eq!(EditorConfig::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let config = EditorConfig::load_or_default(&tmp.path().join("none.ron"));
        assert_eq!(config, EditorConfig::default());
        assert_eq!(config.indent, 4);
    }

    #[test]
    fn test_broken_file_gives_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.ron");
        std::fs::write(&path, "(indent: \"wide\"").unwrap();
        assert!(EditorConfig::load_from(&path).is_err());
        assert_eq!(EditorConfig::load_or_default(&path), EditorConfig::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("config.ron");
        std::fs::write(&path, "(indent: 8)").unwrap();
        let config = EditorConfig::load_from(&path).unwrap();
        assert_eq!(config.indent, 8);
        assert_eq!(config.default_schema, Schema::Flat);
    }

    #[test]
    fn test_recent_files_are_capped_and_deduplicated() {
        let mut config = EditorConfig::default();
        for i in 0..12 {
            config.push_recent(format!("{}.json", i));
        }
        config.push_recent("5.json");
        assert_eq!(config.recent_files.len(), MAX_RECENT_FILES);
        assert_eq!(config.recent_files[0], PathBuf::from("5.json"));
        assert_eq!(config.recent_files.iter().filter(|p| **p == PathBuf::from("5.json")).count(), 1);
    }
}
