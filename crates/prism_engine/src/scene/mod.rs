//! Scene tree, dispatch, camera, and the frame protocol
//!
//! The tree is an arena of nodes with optional behaviors. Events walk the
//! tree in pre-order; structural changes requested during a walk are
//! deferred and applied per node at the start of that node's next update
//! dispatch, so the set of live nodes never changes under an iterating walk.
//! [`Scene`] wires the tree to the light registry, the shared physics world,
//! and the background simulation thread.

mod camera;
mod context;
mod graph;
mod node;
mod scene;
pub(crate) mod simulation;
#[cfg(test)]
mod tests;
mod transform;

pub use camera::{CameraState, PerspectiveCamera};
pub use context::NodeContext;
pub use graph::{SceneError, SceneGraph};
pub use node::{
    InputAction, KeyEvent, MouseButtonEvent, Node, NodeBehavior, NodeEvent, NodeId, RenderView,
};
pub use scene::Scene;
pub use simulation::SimulationThread;
pub use transform::Transform;

/// Framebuffer size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}
