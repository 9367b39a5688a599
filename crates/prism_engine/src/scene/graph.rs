//! Scene graph arena
//!
//! The tree is stored as a slotmap arena keyed by [`NodeId`]; each node holds
//! a non-owning parent back-reference and a list of child ids, so handles stay
//! stable while the tree changes shape. This module owns the pure structure:
//! lookups, world-space transform composition, and the low-level link editing
//! used by the deferred-mutation machinery in [`NodeContext`]. It never
//! fires behavior hooks itself.
//!
//! [`NodeContext`]: crate::scene::NodeContext

use slotmap::SlotMap;
use thiserror::Error;

use crate::foundation::math::{Mat4, Point3, Quat, Vec3};
use crate::scene::camera::CameraState;
use crate::scene::node::{Node, NodeBehavior, NodeId};
use crate::scene::transform::Transform;

/// Structural scene graph errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SceneError {
    /// A node id did not resolve to a live node
    #[error("node not found in scene graph")]
    NodeNotFound,
    /// The root node cannot be detached or reparented
    #[error("the root node cannot be detached or reparented")]
    RootImmovable,
    /// Reparenting onto the node itself or one of its descendants
    #[error("reparenting would create a cycle")]
    WouldCreateCycle,
    /// A behavior constructor returned an error during attach
    #[error("behavior construction failed: {0}")]
    BehaviorInit(String),
}

/// Tree of scene nodes backed by a slotmap arena
pub struct SceneGraph {
    nodes: SlotMap<NodeId, Node>,
    root: NodeId,
}

impl SceneGraph {
    /// Create a graph containing only an enabled, behavior-less root
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(Node::new(None, Transform::identity(), None));
        Self { nodes, root }
    }

    /// Handle of the root node
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Whether `id` resolves to a live node
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Number of live nodes, including the root and pending additions
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph holds only the root
    pub fn is_empty(&self) -> bool {
        self.nodes.len() == 1
    }

    /// Parent of a node, or `None` for the root or a stale id
    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id)?.parent
    }

    /// Live (synced) children of a node
    pub fn children_of(&self, id: NodeId) -> &[NodeId] {
        match self.nodes.get(id) {
            Some(node) => &node.children,
            None => &[],
        }
    }

    /// Children waiting to be spliced into the live list
    pub fn pending_children_of(&self, id: NodeId) -> &[NodeId] {
        match self.nodes.get(id) {
            Some(node) => &node.pending_children,
            None => &[],
        }
    }

    /// Whether a node participates in dispatch walks
    pub fn is_enabled(&self, id: NodeId) -> bool {
        self.nodes.get(id).is_some_and(|n| n.enabled)
    }

    /// Enable or disable a node. A disabled node's whole subtree is skipped
    /// by every dispatch walk; this takes effect immediately, not at sync.
    pub fn set_enabled(&mut self, id: NodeId, enabled: bool) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.enabled = enabled;
        }
    }

    /// Local transform of a node
    pub fn transform(&self, id: NodeId) -> Option<&Transform> {
        self.nodes.get(id).map(|n| &n.transform)
    }

    /// Mutable local transform of a node
    pub fn transform_mut(&mut self, id: NodeId) -> Option<&mut Transform> {
        self.nodes.get_mut(id).map(|n| &mut n.transform)
    }

    /// Camera state exposed by the node's behavior, if any
    pub fn camera_state(&self, id: NodeId) -> Option<&CameraState> {
        self.nodes.get(id)?.behavior.as_ref()?.camera_state()
    }

    /// Number of children; with `recursive` the whole subtree is counted.
    /// Pending additions are included, mirroring what the tree will look
    /// like after the next sync.
    pub fn descendant_count(&self, id: NodeId, recursive: bool) -> usize {
        let Some(node) = self.nodes.get(id) else {
            return 0;
        };
        let direct = node.children.iter().chain(node.pending_children.iter());
        if !recursive {
            return direct.count();
        }
        direct
            .map(|&c| 1 + self.descendant_count(c, true))
            .sum()
    }

    /// Whether `id` is in the subtree rooted at `ancestor` (exclusive)
    pub fn is_descendant_of(&self, id: NodeId, ancestor: NodeId) -> bool {
        let mut cursor = self.parent_of(id);
        while let Some(current) = cursor {
            if current == ancestor {
                return true;
            }
            cursor = self.parent_of(current);
        }
        false
    }

    // --- world-space queries -------------------------------------------------

    /// World transformation matrix, composed through the parent chain.
    /// Identity for a stale id.
    pub fn world_matrix(&self, id: NodeId) -> Mat4 {
        let Some(node) = self.nodes.get(id) else {
            return Mat4::identity();
        };
        match node.parent {
            Some(parent) => self.world_matrix(parent) * node.transform.local_matrix(),
            None => node.transform.local_matrix(),
        }
    }

    /// World-space position of a node's origin
    pub fn world_position(&self, id: NodeId) -> Vec3 {
        let Some(node) = self.nodes.get(id) else {
            return Vec3::zeros();
        };
        match node.parent {
            Some(parent) => self
                .world_matrix(parent)
                .transform_point(&Point3::from(node.transform.position))
                .coords,
            None => node.transform.position,
        }
    }

    /// World-space rotation, composed from parent rotations (scale and shear
    /// in ancestors are ignored)
    pub fn world_rotation(&self, id: NodeId) -> Quat {
        let Some(node) = self.nodes.get(id) else {
            return Quat::identity();
        };
        match node.parent {
            Some(parent) => self.world_rotation(parent) * node.transform.rotation,
            None => node.transform.rotation,
        }
    }

    /// World-space forward direction (-Z)
    pub fn world_forward(&self, id: NodeId) -> Vec3 {
        self.world_rotation(id) * Vec3::new(0.0, 0.0, -1.0)
    }

    /// World-space up direction
    pub fn world_up(&self, id: NodeId) -> Vec3 {
        self.world_rotation(id) * Vec3::y()
    }

    /// World-space right direction
    pub fn world_right(&self, id: NodeId) -> Vec3 {
        self.world_rotation(id) * Vec3::x()
    }

    /// Set the local position so the node ends up at `position` in world
    /// space
    pub fn set_world_position(&mut self, id: NodeId, position: Vec3) {
        let local = match self.parent_of(id) {
            Some(parent) => {
                let to_parent = match self.world_matrix(parent).try_inverse() {
                    Some(inv) => inv,
                    None => return,
                };
                to_parent.transform_point(&Point3::from(position)).coords
            }
            None => position,
        };
        if let Some(node) = self.nodes.get_mut(id) {
            node.transform.position = local;
        }
    }

    /// Set the local rotation so the node ends up with `rotation` in world
    /// space
    pub fn set_world_rotation(&mut self, id: NodeId, rotation: Quat) {
        let local = match self.parent_of(id) {
            Some(parent) => self.world_rotation(parent).inverse() * rotation,
            None => rotation,
        };
        if let Some(node) = self.nodes.get_mut(id) {
            node.transform.rotation = local;
        }
    }

    // --- structural primitives (notification-free) --------------------------

    /// Insert a node under `parent` as a pending child. The caller is
    /// responsible for firing the entered-tree notification.
    pub(crate) fn insert_pending(
        &mut self,
        parent: NodeId,
        transform: Transform,
        behavior: Option<Box<dyn NodeBehavior>>,
    ) -> Option<NodeId> {
        if !self.nodes.contains_key(parent) {
            return None;
        }
        let id = self.nodes.insert(Node::new(Some(parent), transform, behavior));
        self.nodes[parent].pending_children.push(id);
        Some(id)
    }

    /// Record `child` for removal at `parent`'s next sync. Duplicate marks
    /// are ignored so the leaving notification fires at most once.
    pub(crate) fn mark_removal(&mut self, parent: NodeId, child: NodeId) {
        if let Some(node) = self.nodes.get_mut(parent) {
            if !node.pending_removals.contains(&child) {
                node.pending_removals.push(child);
            }
        }
    }

    pub(crate) fn take_pending_removals(&mut self, id: NodeId) -> Vec<NodeId> {
        self.nodes
            .get_mut(id)
            .map_or_else(Vec::new, |n| std::mem::take(&mut n.pending_removals))
    }

    pub(crate) fn take_pending_children(&mut self, id: NodeId) -> Vec<NodeId> {
        self.nodes
            .get_mut(id)
            .map_or_else(Vec::new, |n| std::mem::take(&mut n.pending_children))
    }

    /// Splice previously pending children onto the live list
    pub(crate) fn splice_live(&mut self, id: NodeId, children: Vec<NodeId>) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.children.extend(children);
        }
    }

    /// Unlink `child` from `parent`'s live and pending lists. The parent
    /// back-reference is left to the caller.
    pub(crate) fn unlink_child(&mut self, parent: NodeId, child: NodeId) {
        if let Some(node) = self.nodes.get_mut(parent) {
            node.children.retain(|&c| c != child);
            node.pending_children.retain(|&c| c != child);
            node.pending_removals.retain(|&c| c != child);
        }
    }

    pub(crate) fn set_parent(&mut self, id: NodeId, parent: Option<NodeId>) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.parent = parent;
        }
    }

    pub(crate) fn push_pending(&mut self, parent: NodeId, child: NodeId) {
        if let Some(node) = self.nodes.get_mut(parent) {
            node.pending_children.push(child);
        }
    }

    /// Drop a node and its whole subtree (live and pending children) from
    /// the arena. Leaving notifications must already have fired.
    pub(crate) fn remove_subtree(&mut self, id: NodeId) {
        let Some(node) = self.nodes.remove(id) else {
            return;
        };
        for child in node.children.into_iter().chain(node.pending_children) {
            self.remove_subtree(child);
        }
    }

    /// Take a node's behavior out for a hook call
    pub(crate) fn take_behavior(&mut self, id: NodeId) -> Option<Box<dyn NodeBehavior>> {
        self.nodes.get_mut(id)?.behavior.take()
    }

    /// Put a behavior back after a hook call. Dropped silently if the node
    /// was removed while the hook ran.
    pub(crate) fn restore_behavior(&mut self, id: NodeId, behavior: Box<dyn NodeBehavior>) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.behavior = Some(behavior);
        }
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_2;

    fn insert(graph: &mut SceneGraph, parent: NodeId, transform: Transform) -> NodeId {
        let id = graph.insert_pending(parent, transform, None).unwrap();
        let pending = graph.take_pending_children(parent);
        graph.splice_live(parent, pending);
        id
    }

    #[test]
    fn test_new_graph_has_only_root() {
        let graph = SceneGraph::new();
        assert!(graph.is_empty());
        assert!(graph.contains(graph.root()));
        assert_eq!(graph.parent_of(graph.root()), None);
    }

    #[test]
    fn test_transform_mut_edits_are_visible() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let node = insert(&mut graph, root, Transform::default());

        graph.transform_mut(node).unwrap().position = Vec3::new(0.0, 7.0, 0.0);
        assert_relative_eq!(graph.world_position(node).y, 7.0, epsilon = 1e-5);
        assert!(graph.transform_mut(NodeId::default()).is_none());
    }

    #[test]
    fn test_world_position_composes_parent_chain() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let a = insert(&mut graph, root, Transform::from_position(Vec3::new(1.0, 0.0, 0.0)));
        let b = insert(&mut graph, a, Transform::from_position(Vec3::new(0.0, 2.0, 0.0)));

        let pos = graph.world_position(b);
        assert_relative_eq!(pos.x, 1.0, epsilon = 1e-5);
        assert_relative_eq!(pos.y, 2.0, epsilon = 1e-5);
    }

    #[test]
    fn test_world_position_respects_parent_rotation() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let parent = insert(
            &mut graph,
            root,
            Transform::from_position_rotation(
                Vec3::zeros(),
                Quat::from_axis_angle(&Vec3::y_axis(), FRAC_PI_2),
            ),
        );
        let child = insert(&mut graph, parent, Transform::from_position(Vec3::new(1.0, 0.0, 0.0)));

        // +X in the parent's space maps to -Z in world space.
        let pos = graph.world_position(child);
        assert_relative_eq!(pos.x, 0.0, epsilon = 1e-5);
        assert_relative_eq!(pos.z, -1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_set_world_position_round_trips() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let parent = insert(
            &mut graph,
            root,
            Transform::from_position_rotation(
                Vec3::new(5.0, 0.0, 0.0),
                Quat::from_axis_angle(&Vec3::y_axis(), FRAC_PI_2),
            ),
        );
        let child = insert(&mut graph, parent, Transform::default());

        graph.set_world_position(child, Vec3::new(7.0, 3.0, -2.0));
        let pos = graph.world_position(child);
        assert_relative_eq!(pos.x, 7.0, epsilon = 1e-4);
        assert_relative_eq!(pos.y, 3.0, epsilon = 1e-4);
        assert_relative_eq!(pos.z, -2.0, epsilon = 1e-4);
    }

    #[test]
    fn test_set_world_rotation_round_trips() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let parent = insert(
            &mut graph,
            root,
            Transform::from_position_rotation(
                Vec3::zeros(),
                Quat::from_axis_angle(&Vec3::y_axis(), FRAC_PI_2),
            ),
        );
        let child = insert(&mut graph, parent, Transform::default());

        let target = Quat::from_axis_angle(&Vec3::x_axis(), 0.3);
        graph.set_world_rotation(child, target);
        let world = graph.world_rotation(child);
        assert_relative_eq!(world.angle_to(&target), 0.0, epsilon = 1e-5);
    }

    #[test]
    fn test_descendant_count_includes_pending() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let a = insert(&mut graph, root, Transform::default());
        let _pending = graph.insert_pending(a, Transform::default(), None).unwrap();

        assert_eq!(graph.descendant_count(root, false), 1);
        assert_eq!(graph.descendant_count(root, true), 2);
    }

    #[test]
    fn test_is_descendant_of() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let a = insert(&mut graph, root, Transform::default());
        let b = insert(&mut graph, a, Transform::default());

        assert!(graph.is_descendant_of(b, a));
        assert!(graph.is_descendant_of(b, root));
        assert!(!graph.is_descendant_of(a, b));
        assert!(!graph.is_descendant_of(a, a));
    }

    #[test]
    fn test_remove_subtree_drops_all_descendants() {
        let mut graph = SceneGraph::new();
        let root = graph.root();
        let a = insert(&mut graph, root, Transform::default());
        let b = insert(&mut graph, a, Transform::default());
        let c = graph.insert_pending(b, Transform::default(), None).unwrap();

        graph.unlink_child(root, a);
        graph.remove_subtree(a);
        assert!(!graph.contains(a));
        assert!(!graph.contains(b));
        assert!(!graph.contains(c));
        assert!(graph.contains(root));
    }
}
