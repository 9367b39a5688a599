//! Perspective camera behavior
//!
//! The camera is an ordinary scene node behavior: its position and
//! orientation come from its node's world transform, refreshed once per
//! update dispatch. The refreshed matrices are exposed as a [`CameraState`]
//! snapshot that the scene clones at the start of each frame, so everything
//! downstream (culling, cascade fitting, other behaviors) sees one coherent
//! camera for the whole frame.

use crate::foundation::math::{Mat4, Point3, Vec3};
use crate::scene::context::NodeContext;
use crate::scene::node::NodeBehavior;
use crate::spatial::Frustum;

/// Snapshot of a camera's frame-coherent state
#[derive(Debug, Clone)]
pub struct CameraState {
    /// World-space position
    pub position: Vec3,
    /// World-space forward direction (unit length)
    pub forward: Vec3,
    /// View matrix
    pub view: Mat4,
    /// Projection matrix
    pub projection: Mat4,
    /// Culling frustum of `projection * view`
    pub frustum: Frustum,
    /// Near clip distance
    pub z_near: f32,
    /// Far clip distance
    pub z_far: f32,
}

impl Default for CameraState {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            forward: Vec3::new(0.0, 0.0, -1.0),
            view: Mat4::identity(),
            projection: Mat4::identity(),
            // All-null planes: classifies everything as visible until the
            // first refresh.
            frustum: Frustum::new(Default::default()),
            z_near: 0.1,
            z_far: 1000.0,
        }
    }
}

/// A perspective projection camera driven by its node's transform
pub struct PerspectiveCamera {
    fovy: f32,
    z_near: f32,
    z_far: f32,
    width: f32,
    height: f32,
    state: CameraState,
}

impl PerspectiveCamera {
    /// Create a camera with a vertical field of view in radians and clip
    /// distances. The aspect ratio follows the framebuffer via the resize
    /// hook.
    pub fn new(fovy: f32, z_near: f32, z_far: f32) -> Self {
        Self {
            fovy,
            z_near,
            z_far,
            width: 1.0,
            height: 1.0,
            state: CameraState {
                z_near,
                z_far,
                ..Default::default()
            },
        }
    }

    /// Latest refreshed state
    pub fn state(&self) -> &CameraState {
        &self.state
    }

    /// Vertical field of view in radians
    pub fn fovy(&self) -> f32 {
        self.fovy
    }

    fn refresh(&mut self, position: Vec3, forward: Vec3, up: Vec3) {
        let aspect = if self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        };
        let projection = Mat4::new_perspective(aspect, self.fovy, self.z_near, self.z_far);
        let view = Mat4::look_at_rh(
            &Point3::from(position),
            &Point3::from(position + forward),
            &up,
        );
        self.state = CameraState {
            position,
            forward,
            view,
            projection,
            frustum: Frustum::from_view_projection(&(projection * view)),
            z_near: self.z_near,
            z_far: self.z_far,
        };
    }
}

impl NodeBehavior for PerspectiveCamera {
    fn on_update(&mut self, ctx: &mut NodeContext<'_>) {
        let position = ctx.world_position();
        let forward = ctx.world_forward();
        let up = ctx.graph().world_up(ctx.node());
        self.refresh(position, forward, up);
    }

    fn on_screen_resized(&mut self, _ctx: &mut NodeContext<'_>, width: u32, height: u32) {
        self.width = width as f32;
        self.height = height as f32;
    }

    fn camera_state(&self) -> Option<&CameraState> {
        Some(&self.state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_refresh_builds_consistent_frustum() {
        let mut camera = PerspectiveCamera::new(std::f32::consts::FRAC_PI_2, 0.1, 100.0);
        camera.width = 800.0;
        camera.height = 600.0;
        camera.refresh(
            Vec3::new(0.0, 0.0, 5.0),
            Vec3::new(0.0, 0.0, -1.0),
            Vec3::y(),
        );

        let state = camera.state();
        assert!(state.frustum.contains_point(Vec3::new(0.0, 0.0, -10.0)));
        assert!(!state.frustum.contains_point(Vec3::new(0.0, 0.0, 10.0)));
        assert_relative_eq!(state.position.z, 5.0);
    }

    #[test]
    fn test_default_state_accepts_everything() {
        let state = CameraState::default();
        assert!(state.frustum.contains_point(Vec3::new(1e6, -1e6, 1e6)));
    }
}
