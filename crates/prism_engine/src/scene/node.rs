//! Scene nodes and the behavior trait
//!
//! A node is a slot in the scene graph arena: a local transform, links to its
//! parent and children, an enabled flag, and an optional boxed behavior. All
//! engine callbacks reach behaviors through [`NodeBehavior`] hooks; every hook
//! has a no-op default so a behavior only implements what it cares about.

use crate::foundation::math::Mat4;
use crate::scene::camera::CameraState;
use crate::scene::context::NodeContext;
use crate::scene::transform::Transform;
use crate::spatial::Frustum;

slotmap::new_key_type! {
    /// Stable handle to a scene node. Stays valid across attaches and
    /// detaches elsewhere in the tree; goes stale only when the node itself
    /// is removed.
    pub struct NodeId;
}

/// A single slot in the scene graph arena.
///
/// Structural fields are crate-private; all reads and mutations go through
/// [`crate::scene::SceneGraph`] so the deferred-mutation rules cannot be
/// bypassed.
pub struct Node {
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) pending_children: Vec<NodeId>,
    pub(crate) pending_removals: Vec<NodeId>,
    pub(crate) transform: Transform,
    pub(crate) enabled: bool,
    pub(crate) behavior: Option<Box<dyn NodeBehavior>>,
}

impl Node {
    pub(crate) fn new(
        parent: Option<NodeId>,
        transform: Transform,
        behavior: Option<Box<dyn NodeBehavior>>,
    ) -> Self {
        Self {
            parent,
            children: Vec::new(),
            pending_children: Vec::new(),
            pending_removals: Vec::new(),
            transform,
            enabled: true,
            behavior,
        }
    }
}

/// Key press/release state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    /// Key or button went down
    Press,
    /// Key or button went up
    Release,
    /// Held key auto-repeat
    Repeat,
}

/// A keyboard event forwarded from the windowing collaborator
#[derive(Debug, Clone, Copy)]
pub struct KeyEvent {
    /// Platform key code
    pub key: u32,
    /// Platform scancode
    pub scancode: u32,
    /// Press, release, or repeat
    pub action: InputAction,
    /// Modifier bits as reported by the platform
    pub mods: u32,
}

/// A mouse button event forwarded from the windowing collaborator
#[derive(Debug, Clone, Copy)]
pub struct MouseButtonEvent {
    /// Platform button index
    pub button: u32,
    /// Press or release
    pub action: InputAction,
    /// Modifier bits as reported by the platform
    pub mods: u32,
}

/// Camera matrices for a depth-only render pass (shadow cascade rendering)
#[derive(Debug, Clone, Copy)]
pub struct RenderView {
    /// Projection matrix of the pass
    pub projection: Mat4,
    /// View matrix of the pass
    pub view: Mat4,
    /// Frustum of the combined matrix, for culling
    pub frustum: Frustum,
}

impl RenderView {
    /// Build a view, deriving the culling frustum from the matrices
    pub fn new(projection: Mat4, view: Mat4) -> Self {
        Self {
            projection,
            view,
            frustum: Frustum::from_view_projection(&(projection * view)),
        }
    }
}

/// An event dispatched through the scene tree in pre-order
#[derive(Debug, Clone, Copy)]
pub enum NodeEvent {
    /// Per-frame gameplay update
    Update,
    /// Copy staged physics results into live transforms
    PhysicsSync,
    /// Main color render pass
    Render,
    /// Depth-only render pass with explicit matrices
    RenderDepth(RenderView),
    /// Overlay/2D render pass
    Render2d,
    /// Node entered the live tree
    AddedToScene,
    /// Node is about to leave the live tree
    RemovedFromScene,
    /// Framebuffer size changed
    ScreenResized {
        /// New width in pixels
        width: u32,
        /// New height in pixels
        height: u32,
    },
    /// Keyboard input
    Key(KeyEvent),
    /// Unicode character input
    CharTyped(char),
    /// Scroll wheel input
    MouseScrolled {
        /// Horizontal scroll offset
        dx: f64,
        /// Vertical scroll offset
        dy: f64,
    },
    /// Mouse button input
    MouseButton(MouseButtonEvent),
    /// Cursor moved
    MouseMoved {
        /// Cursor x in window coordinates
        x: f64,
        /// Cursor y in window coordinates
        y: f64,
    },
}

/// Per-node logic attached to a scene node.
///
/// Hooks are invoked by the dispatch walk with the behavior temporarily taken
/// out of its node, so a hook may freely mutate the rest of the tree through
/// the context (including requesting structural changes, which are deferred).
pub trait NodeBehavior {
    /// Called once per frame during the update dispatch
    fn on_update(&mut self, _ctx: &mut NodeContext<'_>) {}

    /// Called once per frame, before the update dispatch, while the
    /// background simulation thread is parked. The only hook from which
    /// staged physics results may be copied into live transforms.
    fn on_physics_sync(&mut self, _ctx: &mut NodeContext<'_>) {}

    /// Called during the main render pass
    fn on_render(&mut self, _ctx: &mut NodeContext<'_>) {}

    /// Called during a depth-only render pass
    fn on_render_depth(&mut self, _ctx: &mut NodeContext<'_>, _view: &RenderView) {}

    /// Called during the overlay render pass
    fn on_render_2d(&mut self, _ctx: &mut NodeContext<'_>) {}

    /// Called when the node is attached (fires immediately, not at sync)
    fn on_added_to_scene(&mut self, _ctx: &mut NodeContext<'_>) {}

    /// Called when the node's removal is synced, before it leaves the arena
    fn on_removed_from_scene(&mut self, _ctx: &mut NodeContext<'_>) {}

    /// Called when the framebuffer is resized, and when the node's subtree
    /// is spliced into the live tree
    fn on_screen_resized(&mut self, _ctx: &mut NodeContext<'_>, _width: u32, _height: u32) {}

    /// Keyboard input
    fn on_key(&mut self, _ctx: &mut NodeContext<'_>, _event: KeyEvent) {}

    /// Unicode character input
    fn on_char_typed(&mut self, _ctx: &mut NodeContext<'_>, _codepoint: char) {}

    /// Scroll wheel input
    fn on_mouse_scrolled(&mut self, _ctx: &mut NodeContext<'_>, _dx: f64, _dy: f64) {}

    /// Mouse button input
    fn on_mouse_button(&mut self, _ctx: &mut NodeContext<'_>, _event: MouseButtonEvent) {}

    /// Cursor movement
    fn on_mouse_moved(&mut self, _ctx: &mut NodeContext<'_>, _x: f64, _y: f64) {}

    /// Camera state, if this behavior drives a camera
    fn camera_state(&self) -> Option<&CameraState> {
        None
    }
}

/// Route an event to the matching hook
pub(crate) fn deliver(
    behavior: &mut dyn NodeBehavior,
    event: &NodeEvent,
    ctx: &mut NodeContext<'_>,
) {
    match event {
        NodeEvent::Update => behavior.on_update(ctx),
        NodeEvent::PhysicsSync => behavior.on_physics_sync(ctx),
        NodeEvent::Render => behavior.on_render(ctx),
        NodeEvent::RenderDepth(view) => behavior.on_render_depth(ctx, view),
        NodeEvent::Render2d => behavior.on_render_2d(ctx),
        NodeEvent::AddedToScene => behavior.on_added_to_scene(ctx),
        NodeEvent::RemovedFromScene => behavior.on_removed_from_scene(ctx),
        NodeEvent::ScreenResized { width, height } => {
            behavior.on_screen_resized(ctx, *width, *height)
        }
        NodeEvent::Key(event) => behavior.on_key(ctx, *event),
        NodeEvent::CharTyped(codepoint) => behavior.on_char_typed(ctx, *codepoint),
        NodeEvent::MouseScrolled { dx, dy } => behavior.on_mouse_scrolled(ctx, *dx, *dy),
        NodeEvent::MouseButton(event) => behavior.on_mouse_button(ctx, *event),
        NodeEvent::MouseMoved { x, y } => behavior.on_mouse_moved(ctx, *x, *y),
    }
}
