//! Rigid body storage and fixed-timestep integration
//!
//! The world is advanced only by the background simulation thread. Results
//! are never written into live scene transforms from here: each dynamic body
//! carries a staged pose plus a needs-sync flag, and the orchestrator copies
//! staged poses out during its own update dispatch.

use bitflags::bitflags;
use slotmap::SlotMap;

use crate::foundation::math::{Quat, Vec3};

slotmap::new_key_type! {
    /// Stable handle to a body in a [`PhysicsWorld`]
    pub struct BodyId;
}

bitflags! {
    /// Collision filter groups.
    ///
    /// A pair of bodies interacts when each body's mask contains the other's
    /// group. Particles skip particle-particle collision by default.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CollisionGroups: u32 {
        /// Immovable level geometry
        const STATIC = 1 << 0;
        /// Simulated rigid bodies
        const DYNAMIC = 1 << 1;
        /// Small debris; no particle-particle collision
        const PARTICLE = 1 << 2;
    }
}

impl CollisionGroups {
    /// The default mask for a body in this group
    pub fn default_mask(self) -> CollisionGroups {
        if self == CollisionGroups::STATIC {
            CollisionGroups::DYNAMIC | CollisionGroups::PARTICLE
        } else if self == CollisionGroups::DYNAMIC {
            CollisionGroups::STATIC | CollisionGroups::DYNAMIC | CollisionGroups::PARTICLE
        } else if self == CollisionGroups::PARTICLE {
            CollisionGroups::STATIC | CollisionGroups::DYNAMIC
        } else {
            CollisionGroups::empty()
        }
    }
}

/// Position and orientation of a body
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    /// World-space position
    pub position: Vec3,
    /// World-space orientation
    pub rotation: Quat,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
        }
    }
}

/// Parameters for creating a body
#[derive(Debug, Clone)]
pub struct BodyDesc {
    /// Mass in kilograms; zero makes the body static
    pub mass: f32,
    /// Radius of the body's collision sphere
    pub radius: f32,
    /// Initial pose
    pub pose: Pose,
    /// Initial linear velocity
    pub linear_velocity: Vec3,
    /// Bounciness in [0, 1]
    pub restitution: f32,
    /// Collision group this body belongs to
    pub group: CollisionGroups,
    /// Groups this body collides with
    pub mask: CollisionGroups,
}

impl Default for BodyDesc {
    fn default() -> Self {
        let group = CollisionGroups::DYNAMIC;
        Self {
            mass: 1.0,
            radius: 0.5,
            pose: Pose::default(),
            linear_velocity: Vec3::zeros(),
            restitution: 0.2,
            group,
            mask: group.default_mask(),
        }
    }
}

#[derive(Debug)]
struct Body {
    inv_mass: f32,
    radius: f32,
    pose: Pose,
    linear_velocity: Vec3,
    angular_velocity: Vec3,
    restitution: f32,
    group: CollisionGroups,
    mask: CollisionGroups,
    staged_pose: Pose,
    needs_sync: bool,
}

impl Body {
    fn is_dynamic(&self) -> bool {
        self.inv_mass > 0.0
    }
}

/// Fixed-substep rigid body world.
///
/// Gravity plus sphere collision against the ground plane and against other
/// bodies, filtered by collision groups. `step` accumulates wall-clock time
/// and advances in fixed substeps so simulation behavior is independent of
/// frame rate.
pub struct PhysicsWorld {
    gravity: Vec3,
    fixed_timestep: f32,
    max_substeps: u32,
    accumulator: f32,
    bodies: SlotMap<BodyId, Body>,
}

impl Default for PhysicsWorld {
    /// Earth gravity, 60 Hz substeps, capped at 16 per step
    fn default() -> Self {
        Self::new(Vec3::new(0.0, -9.81, 0.0), 1.0 / 60.0, 16)
    }
}

impl PhysicsWorld {
    /// Create a world with the given gravity and substep parameters
    pub fn new(gravity: Vec3, fixed_timestep: f32, max_substeps: u32) -> Self {
        Self {
            gravity,
            fixed_timestep,
            max_substeps,
            accumulator: 0.0,
            bodies: SlotMap::with_key(),
        }
    }

    /// Add a body; returns its stable handle
    pub fn add_body(&mut self, desc: BodyDesc) -> BodyId {
        let inv_mass = if desc.mass > 0.0 { 1.0 / desc.mass } else { 0.0 };
        self.bodies.insert(Body {
            inv_mass,
            radius: desc.radius,
            pose: desc.pose,
            linear_velocity: desc.linear_velocity,
            angular_velocity: Vec3::zeros(),
            restitution: desc.restitution,
            group: desc.group,
            mask: desc.mask,
            staged_pose: desc.pose,
            needs_sync: false,
        })
    }

    /// Remove a body; returns false if the handle was stale
    pub fn remove_body(&mut self, id: BodyId) -> bool {
        self.bodies.remove(id).is_some()
    }

    /// Number of bodies in the world
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Iterate the handles of all live bodies
    pub fn body_ids(&self) -> impl Iterator<Item = BodyId> + '_ {
        self.bodies.keys()
    }

    /// Current pose of a body, if it exists
    pub fn body_pose(&self, id: BodyId) -> Option<Pose> {
        self.bodies.get(id).map(|b| b.pose)
    }

    /// Set a body's linear velocity
    pub fn set_linear_velocity(&mut self, id: BodyId, velocity: Vec3) {
        if let Some(body) = self.bodies.get_mut(id) {
            body.linear_velocity = velocity;
        }
    }

    /// Set a body's angular velocity (scaled-axis representation)
    pub fn set_angular_velocity(&mut self, id: BodyId, velocity: Vec3) {
        if let Some(body) = self.bodies.get_mut(id) {
            body.angular_velocity = velocity;
        }
    }

    /// Apply an instantaneous impulse to a body's center of mass
    pub fn apply_impulse(&mut self, id: BodyId, impulse: Vec3) {
        if let Some(body) = self.bodies.get_mut(id) {
            let inv_mass = body.inv_mass;
            body.linear_velocity += impulse * inv_mass;
        }
    }

    /// Teleport a body, clearing any staged result
    pub fn set_body_pose(&mut self, id: BodyId, pose: Pose) {
        if let Some(body) = self.bodies.get_mut(id) {
            body.pose = pose;
            body.staged_pose = pose;
            body.needs_sync = false;
        }
    }

    /// Consume a body's staged pose.
    ///
    /// Returns `Some` at most once per completed step; the needs-sync flag is
    /// cleared so the copy into the live transform happens exactly once.
    pub fn take_staged(&mut self, id: BodyId) -> Option<Pose> {
        let body = self.bodies.get_mut(id)?;
        if body.needs_sync {
            body.needs_sync = false;
            Some(body.staged_pose)
        } else {
            None
        }
    }

    /// Advance the simulation by `dt` seconds of wall-clock time.
    ///
    /// Internally accumulates time and runs whole fixed substeps, capped at
    /// the configured maximum so a long stall cannot spiral the frame time.
    /// Returns the number of substeps executed.
    pub fn step(&mut self, dt: f32) -> u32 {
        self.accumulator += dt.max(0.0);
        let mut substeps = 0;
        while self.accumulator >= self.fixed_timestep && substeps < self.max_substeps {
            self.substep(self.fixed_timestep);
            self.accumulator -= self.fixed_timestep;
            substeps += 1;
        }
        // Drop the backlog the cap refused to simulate.
        if substeps == self.max_substeps {
            self.accumulator = self.accumulator.min(self.fixed_timestep);
        }

        if substeps > 0 {
            for body in self.bodies.values_mut() {
                if body.is_dynamic() {
                    body.staged_pose = body.pose;
                    body.needs_sync = true;
                }
            }
        }
        substeps
    }

    fn substep(&mut self, h: f32) {
        for body in self.bodies.values_mut() {
            if !body.is_dynamic() {
                continue;
            }
            body.linear_velocity += self.gravity * h;
            body.pose.position += body.linear_velocity * h;
            if body.angular_velocity != Vec3::zeros() {
                body.pose.rotation =
                    Quat::from_scaled_axis(body.angular_velocity * h) * body.pose.rotation;
            }

            // Ground plane at y = 0.
            if body.pose.position.y < body.radius && body.linear_velocity.y < 0.0 {
                body.pose.position.y = body.radius;
                body.linear_velocity.y = -body.linear_velocity.y * body.restitution;
            }
        }

        self.resolve_body_contacts();
    }

    /// Impulse-free positional separation for overlapping sphere pairs that
    /// pass the group/mask filter.
    fn resolve_body_contacts(&mut self) {
        let ids: Vec<BodyId> = self.bodies.keys().collect();
        for i in 0..ids.len() {
            for j in (i + 1)..ids.len() {
                let (a, b) = (ids[i], ids[j]);
                let Some([body_a, body_b]) = self.bodies.get_disjoint_mut([a, b]) else {
                    continue;
                };
                if !body_a.mask.intersects(body_b.group) || !body_b.mask.intersects(body_a.group)
                {
                    continue;
                }

                let delta = body_b.pose.position - body_a.pose.position;
                let min_dist = body_a.radius + body_b.radius;
                let dist_sq = delta.magnitude_squared();
                if dist_sq >= min_dist * min_dist || dist_sq == 0.0 {
                    continue;
                }

                let dist = dist_sq.sqrt();
                let normal = delta / dist;
                let penetration = min_dist - dist;
                let total_inv_mass = body_a.inv_mass + body_b.inv_mass;
                if total_inv_mass == 0.0 {
                    continue;
                }
                body_a.pose.position -= normal * (penetration * body_a.inv_mass / total_inv_mass);
                body_b.pose.position += normal * (penetration * body_b.inv_mass / total_inv_mass);
            }
        }
    }
}
