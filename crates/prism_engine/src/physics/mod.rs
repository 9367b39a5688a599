//! Physics simulation
//!
//! A small fixed-substep rigid body world plus the node behavior that ties a
//! body to a scene node. The world is shared between the render/orchestrator
//! thread and the background simulation thread behind a mutex; the frame
//! handshake (see [`crate::scene::SimulationThread`]) guarantees the two
//! threads never contend for it.

mod rigid_body;
mod world;

pub use rigid_body::RigidBody;
pub use world::{BodyDesc, BodyId, CollisionGroups, PhysicsWorld, Pose};

use std::sync::{Arc, Mutex, MutexGuard};

/// Shared, clonable handle to the physics world.
///
/// The orchestrator locks it during the physics-sync dispatch; the background
/// thread locks it for the duration of one simulation step. The handshake
/// partitions those two windows in time, so the lock is never contended in
/// steady state.
#[derive(Clone)]
pub struct PhysicsHandle {
    world: Arc<Mutex<PhysicsWorld>>,
}

impl PhysicsHandle {
    /// Wrap a world in a shared handle
    pub fn new(world: PhysicsWorld) -> Self {
        Self {
            world: Arc::new(Mutex::new(world)),
        }
    }

    /// Lock the world for direct access
    pub fn lock(&self) -> MutexGuard<'_, PhysicsWorld> {
        self.world.lock().unwrap()
    }

    /// Add a body; returns its stable handle
    pub fn add_body(&self, desc: BodyDesc) -> BodyId {
        self.lock().add_body(desc)
    }

    /// Remove a body; returns false if the handle was stale
    pub fn remove_body(&self, id: BodyId) -> bool {
        self.lock().remove_body(id)
    }

    /// Consume a body's staged pose; see [`PhysicsWorld::take_staged`]
    pub fn take_staged(&self, id: BodyId) -> Option<Pose> {
        self.lock().take_staged(id)
    }
}
