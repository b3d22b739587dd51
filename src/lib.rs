//! GRAB level editor core
//!
//! Loads, edits and saves GRAB level files in both on-disk layouts:
//! - `flat`: schema 1, a flat list of type-tagged nodes with passthrough data
//! - `tree`: schema 2, id-addressed nodes with nested groups
//!
//! `scene` holds the schema-independent editing core (node arena, document
//! trait, property model, editor session) and `render` turns a session into
//! per-frame draw data for a viewport.

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod config;
pub mod flat;
pub mod project;
pub mod render;
pub mod scene;
pub mod tree;
pub mod world;
