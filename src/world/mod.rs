//! World module - value types and the on-disk level format
//!
//! Everything both level schemas share:
//! - Vectors, rotations and transforms
//! - Colors and shape codes
//! - Lenient JSON field readers
//! - The level header (title, tags, ambience) and file load/save

mod color;
mod info;
pub mod json;
mod level;
mod math;
mod shape;
mod transform;

pub use color::*;
pub use info::*;
pub use level::*;
pub use math::*;
pub use shape::*;
pub use transform::*;
