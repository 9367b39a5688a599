//! Dispatch context handed to behavior hooks
//!
//! [`NodeContext`] bundles mutable access to the scene graph with the frame
//! environment (lights, physics handle, viewport, camera snapshot, delta
//! time). It is also where the structural operations live: attach fires the
//! entered-tree notification immediately, while detach and reparent are
//! deferred and applied by the per-node sync pass at the start of each
//! node's update dispatch. Removals are always synced before additions.

use crate::foundation::logging::error;
use crate::foundation::math::{Mat4, Quat, Vec3};
use crate::lighting::LightRegistry;
use crate::physics::PhysicsHandle;
use crate::scene::camera::CameraState;
use crate::scene::graph::{SceneError, SceneGraph};
use crate::scene::node::{deliver, NodeBehavior, NodeEvent, NodeId};
use crate::scene::transform::Transform;
use crate::scene::Viewport;

/// Everything a behavior hook may touch during dispatch.
///
/// `node` identifies the node whose hook is currently running; the transform
/// and world-space conveniences operate on that node.
pub struct NodeContext<'a> {
    pub(crate) graph: &'a mut SceneGraph,
    pub(crate) lights: &'a mut LightRegistry,
    pub(crate) physics: &'a PhysicsHandle,
    pub(crate) viewport: Viewport,
    pub(crate) camera: Option<CameraState>,
    pub(crate) game_delta: f32,
    pub(crate) node: NodeId,
}

impl<'a> NodeContext<'a> {
    /// The node whose hook is currently running
    pub fn node(&self) -> NodeId {
        self.node
    }

    /// Shared scene graph
    pub fn graph(&self) -> &SceneGraph {
        self.graph
    }

    /// Mutable scene graph access (transforms, enabled flags)
    pub fn graph_mut(&mut self) -> &mut SceneGraph {
        self.graph
    }

    /// Light registry for this scene
    pub fn lights(&self) -> &LightRegistry {
        self.lights
    }

    /// Mutable light registry access
    pub fn lights_mut(&mut self) -> &mut LightRegistry {
        self.lights
    }

    /// Handle to the shared physics world
    pub fn physics(&self) -> &PhysicsHandle {
        self.physics
    }

    /// Current framebuffer size
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Snapshot of the active camera as of the start of this frame, if one
    /// is set
    pub fn camera(&self) -> Option<&CameraState> {
        self.camera.as_ref()
    }

    /// Game-time delta of the current frame in seconds
    pub fn game_delta(&self) -> f32 {
        self.game_delta
    }

    // --- current-node conveniences -------------------------------------------

    /// Local transform of the current node
    pub fn transform(&self) -> &Transform {
        // The current node is live for the duration of its hook.
        self.graph.transform(self.node).unwrap()
    }

    /// Mutable local transform of the current node
    pub fn transform_mut(&mut self) -> &mut Transform {
        self.graph.transform_mut(self.node).unwrap()
    }

    /// World matrix of the current node
    pub fn world_matrix(&self) -> Mat4 {
        self.graph.world_matrix(self.node)
    }

    /// World position of the current node
    pub fn world_position(&self) -> Vec3 {
        self.graph.world_position(self.node)
    }

    /// World rotation of the current node
    pub fn world_rotation(&self) -> Quat {
        self.graph.world_rotation(self.node)
    }

    /// World forward direction of the current node
    pub fn world_forward(&self) -> Vec3 {
        self.graph.world_forward(self.node)
    }

    // --- structural operations -----------------------------------------------

    /// Attach a new node under `parent`.
    ///
    /// The node joins `parent`'s pending list and becomes a live child at
    /// `parent`'s next update sync, but the entered-tree hook fires
    /// immediately so the behavior can acquire resources (register lights,
    /// create physics bodies) right away. Returns `None` if `parent` is
    /// stale.
    pub fn attach(
        &mut self,
        parent: NodeId,
        transform: Transform,
        behavior: Option<Box<dyn NodeBehavior>>,
    ) -> Option<NodeId> {
        let id = self.graph.insert_pending(parent, transform, behavior)?;
        self.fire(id, &NodeEvent::AddedToScene);
        Some(id)
    }

    /// Attach a node whose behavior construction may fail.
    ///
    /// On error the node is not created; the error is logged and `None` is
    /// returned so one bad behavior cannot take down the frame.
    pub fn attach_with<B, F>(
        &mut self,
        parent: NodeId,
        transform: Transform,
        init: F,
    ) -> Option<NodeId>
    where
        B: NodeBehavior + 'static,
        F: FnOnce() -> Result<B, SceneError>,
    {
        match init() {
            Ok(behavior) => self.attach(parent, transform, Some(Box::new(behavior))),
            Err(err) => {
                error!("failed to construct node behavior: {err}");
                None
            }
        }
    }

    /// Request removal of `node` and its subtree.
    ///
    /// The removal is recorded at the node's parent and applied at that
    /// parent's next update sync; until then the node stays live. Returns
    /// false for the root or a stale id. Duplicate requests coalesce.
    pub fn request_detach(&mut self, node: NodeId) -> bool {
        let Some(parent) = self.graph.parent_of(node) else {
            return false;
        };
        self.graph.mark_removal(parent, node);
        true
    }

    /// Request removal of the current node
    pub fn request_detach_self(&mut self) -> bool {
        self.request_detach(self.node)
    }

    /// Move `node` under `new_parent`, keeping its local transform.
    ///
    /// The node leaves its old parent immediately and joins the new parent's
    /// pending list, becoming a live child at the new parent's next update
    /// sync. Fails if either id is stale, if `node` is the root, or if
    /// `new_parent` is `node` itself or one of its descendants (which would
    /// detach the subtree from the root into a cycle). No entered- or
    /// leaving-tree hooks fire: the node never leaves the scene.
    pub fn transfer(&mut self, node: NodeId, new_parent: NodeId) -> Result<(), SceneError> {
        if !self.graph.contains(node) || !self.graph.contains(new_parent) {
            return Err(SceneError::NodeNotFound);
        }
        let Some(old_parent) = self.graph.parent_of(node) else {
            return Err(SceneError::RootImmovable);
        };
        if new_parent == node || self.graph.is_descendant_of(new_parent, node) {
            return Err(SceneError::WouldCreateCycle);
        }
        if old_parent == new_parent {
            return Ok(());
        }
        self.graph.unlink_child(old_parent, node);
        self.graph.set_parent(node, Some(new_parent));
        self.graph.push_pending(new_parent, node);
        Ok(())
    }

    // --- dispatch ------------------------------------------------------------

    /// Pre-order event dispatch over the subtree rooted at `root`.
    ///
    /// A disabled node terminates the walk for its whole subtree. For the
    /// update event, each visited node syncs its pending structural changes
    /// (removals first, then additions) before its own hook runs, so newly
    /// spliced children are visited in the same walk.
    pub(crate) fn dispatch(&mut self, root: NodeId, event: &NodeEvent) {
        if !self.graph.is_enabled(root) {
            return;
        }
        if matches!(event, NodeEvent::Update) {
            self.sync_pending(root);
        }
        self.fire(root, event);
        let children = self.graph.children_of(root).to_vec();
        for child in children {
            self.dispatch(child, event);
        }
    }

    /// Apply one node's deferred structural changes.
    fn sync_pending(&mut self, id: NodeId) {
        let removals = self.graph.take_pending_removals(id);
        for target in removals {
            if !self.graph.contains(target) {
                continue;
            }
            // Leaving hooks fire over the live subtree before anything is
            // unlinked, so behaviors can still reach their parents.
            self.dispatch(target, &NodeEvent::RemovedFromScene);
            self.graph.unlink_child(id, target);
            self.graph.remove_subtree(target);
        }

        let additions = self.graph.take_pending_children(id);
        if additions.is_empty() {
            return;
        }
        let Viewport { width, height } = self.viewport;
        for &child in &additions {
            // A freshly spliced subtree has never seen the framebuffer size.
            self.dispatch(child, &NodeEvent::ScreenResized { width, height });
        }
        self.graph.splice_live(id, additions);
    }

    /// Run one node's hook with its behavior temporarily taken out of the
    /// arena, so the hook can mutate any node through the context.
    fn fire(&mut self, id: NodeId, event: &NodeEvent) {
        let Some(mut behavior) = self.graph.take_behavior(id) else {
            return;
        };
        let saved = self.node;
        self.node = id;
        deliver(behavior.as_mut(), event, self);
        self.node = saved;
        self.graph.restore_behavior(id, behavior);
    }
}
