//! Rigid body node behavior
//!
//! Bridges a scene node to a body in the shared physics world. The body is
//! created when the node enters the tree (seeded from the node's world pose)
//! and removed when it leaves. Simulation results reach the node through the
//! physics-sync hook, the one point in the frame where the background thread
//! is guaranteed parked: the staged pose is consumed and written into the
//! node's world transform.

use crate::foundation::logging::warn;
use crate::physics::{BodyDesc, BodyId, Pose};
use crate::scene::{NodeBehavior, NodeContext};

/// Attaches a physics body to a scene node
pub struct RigidBody {
    desc: BodyDesc,
    restrain_rotation: bool,
    body: Option<BodyId>,
}

impl RigidBody {
    /// Create a rigid body from a descriptor. The descriptor's pose is
    /// overwritten with the node's world pose when the node enters the tree.
    pub fn new(desc: BodyDesc) -> Self {
        Self {
            desc,
            restrain_rotation: false,
            body: None,
        }
    }

    /// Keep the node's rotation under manual control: simulated positions
    /// are still copied in, simulated rotations are discarded
    pub fn restrain_rotation(mut self) -> Self {
        self.restrain_rotation = true;
        self
    }

    /// Handle of the simulated body, present while the node is in the tree
    pub fn body(&self) -> Option<BodyId> {
        self.body
    }

    /// Teleport the body to the node's current world pose, discarding any
    /// staged simulation result
    pub fn push_pose(&self, ctx: &mut NodeContext<'_>) {
        let Some(id) = self.body else {
            return;
        };
        let pose = Pose {
            position: ctx.world_position(),
            rotation: ctx.world_rotation(),
        };
        ctx.physics().lock().set_body_pose(id, pose);
    }
}

impl NodeBehavior for RigidBody {
    fn on_added_to_scene(&mut self, ctx: &mut NodeContext<'_>) {
        let mut desc = self.desc.clone();
        desc.pose = Pose {
            position: ctx.world_position(),
            rotation: ctx.world_rotation(),
        };
        self.body = Some(ctx.physics().add_body(desc));
    }

    fn on_removed_from_scene(&mut self, ctx: &mut NodeContext<'_>) {
        if let Some(id) = self.body.take() {
            if !ctx.physics().remove_body(id) {
                warn!("rigid body was already removed from the world");
            }
        }
    }

    fn on_physics_sync(&mut self, ctx: &mut NodeContext<'_>) {
        let Some(id) = self.body else {
            return;
        };
        // Consume-once: an unchanged body stages nothing and the node's
        // transform is left alone.
        let Some(pose) = ctx.physics().take_staged(id) else {
            return;
        };
        let node = ctx.node();
        ctx.graph_mut().set_world_position(node, pose.position);
        if !self.restrain_rotation {
            ctx.graph_mut().set_world_rotation(node, pose.rotation);
        }
    }
}
