//! Local position/rotation/scale of a scene node
//!
//! A transform stores only local values. World-space values are composed on
//! demand through the node's parent chain by the scene graph (see the
//! `world_*` queries on [`crate::scene::SceneGraph`]); nothing here caches a
//! world matrix, so an ancestor change is always reflected in the next query.

use crate::foundation::math::{constants, Mat4, Quat, Vec3};

/// Position, rotation, and scale relative to the parent node
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// Local position
    pub position: Vec3,
    /// Local rotation
    pub rotation: Quat,
    /// Local scale factors
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    /// Create a new identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a transform with only position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a transform with position and rotation
    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            ..Default::default()
        }
    }

    /// Convert to a local-space transformation matrix
    pub fn local_matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.position)
            * self.rotation.to_homogeneous()
            * Mat4::new_nonuniform_scaling(&self.scale)
    }

    /// Local forward direction (-Z rotated by the local rotation)
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::new(0.0, 0.0, -1.0)
    }

    /// Local up direction
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::y()
    }

    /// Local right direction
    pub fn right(&self) -> Vec3 {
        self.rotation * Vec3::x()
    }

    /// Set the local rotation so that the forward direction matches `dir`.
    ///
    /// A degenerate direction leaves the rotation unchanged. The antiparallel
    /// case (dir opposite the current forward axis) picks an arbitrary
    /// perpendicular axis for the half-turn.
    pub fn set_forward(&mut self, dir: Vec3) {
        let Some(dir) = dir.try_normalize(constants::EPSILON) else {
            return;
        };
        let from = Vec3::new(0.0, 0.0, -1.0);
        self.rotation = match Quat::rotation_between(&from, &dir) {
            Some(rot) => rot,
            // Antiparallel: rotate half a turn around any perpendicular axis.
            None => Quat::from_axis_angle(&Vec3::y_axis(), constants::PI),
        };
    }
}
