//! Node Transforms
//!
//! Two-tier transform system:
//! - Transform: Local position/rotation/scale (relative to the parent group)
//! - GlobalTransform: Computed world-space matrix (for rendering)
//!
//! For nodes inside a group, GlobalTransform = parent.GlobalTransform * self.Transform
//! For root nodes, GlobalTransform = Transform

use serde::{Deserialize, Serialize};
use super::math::{mat4_from_trs, mat4_identity, mat4_mul, mat4_transform_point, Mat4, Vec3};

/// Local transform relative to parent (or world if no parent).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// Position relative to parent
    pub position: Vec3,
    /// Rotation in euler angles (degrees)
    pub rotation: Vec3,
    /// Per-axis scale factor
    pub scale: Vec3,
}

impl Transform {
    /// Identity transform (origin, no rotation, scale 1)
    pub const IDENTITY: Transform = Transform {
        position: Vec3::ZERO,
        rotation: Vec3::ZERO,
        scale: Vec3::ONE,
    };

    /// Create transform at a position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    /// Create transform with position and scale
    pub fn from_position_scale(position: Vec3, scale: Vec3) -> Self {
        Self {
            position,
            rotation: Vec3::ZERO,
            scale,
        }
    }

    /// Convert to a 4x4 transformation matrix
    pub fn to_matrix(&self) -> Mat4 {
        mat4_from_trs(self.position, self.rotation, self.scale)
    }

    /// Translate by an offset
    pub fn translate(&mut self, offset: Vec3) {
        self.position = self.position + offset;
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// World-space transform, computed from the group hierarchy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlobalTransform {
    /// The full 4x4 world transformation matrix
    matrix: Mat4,
}

impl GlobalTransform {
    /// Identity global transform
    pub fn identity() -> Self {
        Self {
            matrix: mat4_identity(),
        }
    }

    /// Create from a local transform (for root nodes)
    pub fn from_transform(transform: &Transform) -> Self {
        Self {
            matrix: transform.to_matrix(),
        }
    }

    /// Compute child's global transform from parent's global and child's local
    pub fn from_parent_and_local(parent: &GlobalTransform, local: &Transform) -> Self {
        Self {
            matrix: mat4_mul(&parent.matrix, &local.to_matrix()),
        }
    }

    /// Get the world position (translation component)
    pub fn position(&self) -> Vec3 {
        Vec3::new(self.matrix[0][3], self.matrix[1][3], self.matrix[2][3])
    }

    /// Get the full transformation matrix
    pub fn matrix(&self) -> &Mat4 {
        &self.matrix
    }

    /// Transform a point from local space to world space
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        mat4_transform_point(&self.matrix, point)
    }
}

impl Default for GlobalTransform {
    fn default() -> Self {
        Self::identity()
    }
}
