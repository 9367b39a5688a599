//! # Prism Engine
//!
//! The runtime core of a real-time 3D engine: a scene-node tree with
//! deferred structural mutation, a two-thread frame protocol that overlaps
//! physics stepping with the rest of the frame, spatial culling primitives,
//! and cascaded shadow map fitting.
//!
//! ## Features
//!
//! - **Scene Tree**: Arena-backed node hierarchy with stable handles,
//!   per-node behaviors, and pre-order event dispatch
//! - **Deferred Mutation**: Attach, detach, and reparent requests are
//!   applied at well-defined sync points, never under an iterating walk
//! - **Concurrent Simulation**: A background thread steps the physics
//!   world, coordinated by two single-permit latches
//! - **Culling Primitives**: Conservative sphere/box/frustum tests
//! - **Shadow Cascades**: Logarithmic frustum splits with sphere-bounded,
//!   rotation-invariant cascade fitting
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use prism_engine::prelude::*;
//!
//! fn main() {
//!     let config = EngineConfig::default();
//!     let mut scene = Scene::new(&config);
//!     let root = scene.root();
//!
//!     let camera = scene
//!         .attach(
//!             root,
//!             Transform::from_position(Vec3::new(0.0, 2.0, 10.0)),
//!             Some(Box::new(PerspectiveCamera::new(1.2, 0.1, 1000.0))),
//!         )
//!         .unwrap();
//!     scene.set_active_camera(Some(camera));
//!
//!     loop {
//!         scene.turn();
//!     }
//! }
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod foundation;
pub mod lighting;
pub mod physics;
pub mod scene;
pub mod spatial;

pub use config::{ConfigError, EngineConfig};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        config::{ConfigError, EngineConfig},
        foundation::math::{Mat4, Quat, Vec3},
        foundation::time::FrameClock,
        lighting::{DirectionalLight, LightRegistry, PointLight, ShadowCascades},
        physics::{BodyDesc, CollisionGroups, PhysicsWorld, RigidBody},
        scene::{
            NodeBehavior, NodeContext, NodeEvent, NodeId, PerspectiveCamera, Scene, SceneGraph,
            Transform, Viewport,
        },
        spatial::{Aabb, Frustum, Plane, Sphere},
    };
}
