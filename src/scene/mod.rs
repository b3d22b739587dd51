//! Scene module - schema-independent editing core
//!
//! - `SceneGraph`: generational arena holding the node forest
//! - `LevelDocument`: what both level schemas provide
//! - `EditableNode`: inspector field access per node variant
//! - `EditorSession`: selection, current file, dirty flag and undo

mod document;
mod graph;
mod property;
mod session;

pub use document::*;
pub use graph::*;
pub use property::*;
pub use session::*;
