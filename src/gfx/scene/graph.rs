//! # Scene Graph
//!
//! Arena of [`SceneNode`]s keyed by [`NodeId`]. The graph owns every node;
//! parents reference their children by id and children keep a back-reference
//! to their parent. All mutations go through the graph so that hierarchy
//! links, dirty flags and listener queues stay consistent.
//!
//! ## Transform update
//!
//! [`SceneGraph::update_world_transformation`] walks a subtree root-first,
//! recomputes dirty local matrices and composes `world = parent.world * local`.
//! World matrices read between an edit and the next update pass are stale;
//! use [`SceneGraph::compute_world_matrix`] when a fresh value is needed.
//!
//! ## Usage
//!
//! ```no_run
//! use cgmath::Vector3;
//! use kelpie::gfx::scene::{MeshLibrary, SceneGraph};
//!
//! let mut graph = SceneGraph::new();
//! let mut meshes = MeshLibrary::new();
//! let root = graph.create_node("root");
//! let child = graph.create_node("child");
//! graph.add_child(root, child);
//! if let Some(mut node) = graph.node_mut(child) {
//!     node.set_position(Vector3::new(1.0, 0.0, 0.0));
//! }
//! graph.update_world_transformation(root, &mut meshes);
//! ```

use std::collections::{HashMap, HashSet, VecDeque};

use cgmath::{Matrix4, Quaternion, Rad, Rotation3, SquareMatrix, Vector3};

use super::{
    events::{ListenerId, NodeChange, SceneEvent},
    mesh::{MeshId, MeshLibrary},
    node::{NodeId, NodeKind, SceneNode},
};

#[derive(Debug, Default)]
pub struct SceneGraph {
    nodes: HashMap<NodeId, SceneNode>,
    queues: HashMap<ListenerId, VecDeque<SceneEvent>>,
    next_listener: u32,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a detached node with identity transform.
    pub fn create_node(&mut self, name: impl Into<String>) -> NodeId {
        let node = SceneNode::new(name);
        let id = node.id;
        self.nodes.insert(id, node);
        id
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(&id)
    }

    /// Mutable handle whose setters mark the node dirty and notify listeners.
    pub fn node_mut(&mut self, id: NodeId) -> Option<NodeMut<'_>> {
        if self.nodes.contains_key(&id) {
            Some(NodeMut { graph: self, id })
        } else {
            None
        }
    }

    // ---- hierarchy -------------------------------------------------------

    /// Attaches `child` under `parent`, detaching it from any previous parent.
    ///
    /// The child's subtree picks up the parent's listeners. Returns `false`
    /// if either node is unknown or the link would create a cycle.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        if parent == child || !self.contains(parent) || !self.contains(child) {
            return false;
        }
        if self.is_ancestor(child, parent) {
            log::warn!("Refusing to attach {} under its own descendant {}", child, parent);
            return false;
        }

        if let Some(old_parent) = self.nodes[&child].parent {
            if old_parent == parent {
                return true;
            }
            self.unlink(old_parent, child);
            self.emit_changed(old_parent, NodeChange::Hierarchy);
        }

        if let Some(node) = self.nodes.get_mut(&parent) {
            node.children.push(child);
        }
        if let Some(node) = self.nodes.get_mut(&child) {
            node.parent = Some(parent);
        }

        let inherited = self.nodes[&parent].listeners.clone();
        for listener in inherited {
            self.watch_subtree(listener, child);
        }

        self.emit_changed(parent, NodeChange::Hierarchy);
        true
    }

    /// Detaches `child` from `parent`. The child keeps its own subtree and listeners.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> bool {
        let is_child = self
            .nodes
            .get(&child)
            .is_some_and(|node| node.parent == Some(parent));
        if !is_child {
            return false;
        }
        self.unlink(parent, child);
        self.emit_changed(parent, NodeChange::Hierarchy);
        true
    }

    fn unlink(&mut self, parent: NodeId, child: NodeId) {
        if let Some(node) = self.nodes.get_mut(&parent) {
            node.children.retain(|c| *c != child);
        }
        if let Some(node) = self.nodes.get_mut(&child) {
            node.parent = None;
        }
    }

    /// True if `ancestor` is `node` or lies on its parent chain.
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.nodes.get(&id).and_then(|n| n.parent);
        }
        false
    }

    /// Topmost ancestor of `id`.
    pub fn root_of(&self, id: NodeId) -> Option<NodeId> {
        let mut current = self.nodes.get(&id)?;
        while let Some(parent) = current.parent.and_then(|p| self.nodes.get(&p)) {
            current = parent;
        }
        Some(current.id)
    }

    // ---- transforms ------------------------------------------------------

    /// Recomputes world matrices for `root` and its descendants.
    ///
    /// Parents are always processed before their children. The starting
    /// parent matrix is the cached world of `root`'s parent, or identity for a
    /// parentless root. Each attached mesh receives its node's world matrix.
    pub fn update_world_transformation(&mut self, root: NodeId, meshes: &mut MeshLibrary) {
        let Some(start) = self.nodes.get(&root) else {
            return;
        };
        let parent_world = start
            .parent
            .and_then(|p| self.nodes.get(&p))
            .map(|p| p.world)
            .unwrap_or_else(Matrix4::identity);

        let mut stack = vec![(root, parent_world)];
        while let Some((id, parent_world)) = stack.pop() {
            let Some(node) = self.nodes.get_mut(&id) else {
                continue;
            };
            node.refresh_local();
            node.world = parent_world * node.local;

            for mesh in &node.meshes {
                if let Some(mesh) = meshes.get_mut(*mesh) {
                    mesh.set_model_matrix(node.world);
                }
            }

            let world = node.world;
            stack.extend(node.children.iter().rev().map(|child| (*child, world)));
        }
    }

    /// World matrix composed from current local attributes up the parent chain.
    pub fn compute_world_matrix(&self, id: NodeId) -> Option<Matrix4<f32>> {
        let mut node = self.nodes.get(&id)?;
        let mut world = node.local_matrix();
        while let Some(parent) = node.parent.and_then(|p| self.nodes.get(&p)) {
            world = parent.local_matrix() * world;
            node = parent;
        }
        Some(world)
    }

    // ---- queries ---------------------------------------------------------

    /// Depth-first pre-order search of `root`'s subtree, `root` included.
    pub fn find_by_id(&self, root: NodeId, id: NodeId) -> Option<NodeId> {
        self.find(root, |node| node.id == id)
    }

    /// First node named `name` in depth-first pre-order, `root` included.
    pub fn find_by_name(&self, root: NodeId, name: &str) -> Option<NodeId> {
        self.find(root, |node| node.name == name)
    }

    fn find(&self, root: NodeId, predicate: impl Fn(&SceneNode) -> bool) -> Option<NodeId> {
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let Some(node) = self.nodes.get(&id) else {
                continue;
            };
            if predicate(node) {
                return Some(id);
            }
            stack.extend(node.children.iter().rev());
        }
        None
    }

    /// Light nodes of `root`'s subtree in depth-first pre-order.
    pub fn light_nodes(&self, root: NodeId) -> Vec<NodeId> {
        self.descendants(root)
            .into_iter()
            .filter(|id| self.nodes.get(id).is_some_and(|n| n.kind.is_light()))
            .collect()
    }

    /// `root` and all of its descendants in depth-first pre-order.
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut visited = HashSet::new();
        let mut order = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let Some(node) = self.nodes.get(&id) else {
                continue;
            };
            if !visited.insert(id) {
                continue;
            }
            order.push(id);
            stack.extend(node.children.iter().rev());
        }
        order
    }

    // ---- lifecycle -------------------------------------------------------

    /// Removes `id` and its subtree. Meshes no surviving node references are
    /// dropped from the library along with their GPU buffers.
    ///
    /// # Returns
    /// Every removed node id, parents first
    pub fn destroy(&mut self, id: NodeId, meshes: &mut MeshLibrary) -> Vec<NodeId> {
        if let Some(parent) = self.nodes.get(&id).and_then(|n| n.parent) {
            self.unlink(parent, id);
            self.emit_changed(parent, NodeChange::Hierarchy);
        }

        let removed = self.descendants(id);
        let mut orphaned = HashSet::new();
        for node_id in &removed {
            if let Some(node) = self.nodes.remove(node_id) {
                orphaned.extend(node.meshes);
            }
        }
        for node in self.nodes.values() {
            for mesh in &node.meshes {
                orphaned.remove(mesh);
            }
        }
        for mesh in &orphaned {
            meshes.remove(*mesh);
        }
        log::debug!(
            "Destroyed {} and {} descendant(s), freed {} mesh(es)",
            id,
            removed.len().saturating_sub(1),
            orphaned.len()
        );
        removed
    }

    // ---- listeners -------------------------------------------------------

    pub fn add_listener(&mut self) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.queues.insert(id, VecDeque::new());
        id
    }

    /// Removes the listener from every node and drops its queue.
    pub fn remove_listener(&mut self, listener: ListenerId) {
        self.queues.remove(&listener);
        for node in self.nodes.values_mut() {
            node.listeners.retain(|l| *l != listener);
        }
    }

    pub fn watch(&mut self, listener: ListenerId, id: NodeId) {
        if let Some(node) = self.nodes.get_mut(&id) {
            if !node.listeners.contains(&listener) {
                node.listeners.push(listener);
            }
        }
    }

    pub fn watch_subtree(&mut self, listener: ListenerId, root: NodeId) {
        for id in self.descendants(root) {
            self.watch(listener, id);
        }
    }

    pub fn unwatch(&mut self, listener: ListenerId, id: NodeId) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.listeners.retain(|l| *l != listener);
        }
    }

    /// Takes every event queued for `listener` since the last drain.
    pub fn drain_events(&mut self, listener: ListenerId) -> Vec<SceneEvent> {
        self.queues
            .get_mut(&listener)
            .map(|queue| queue.drain(..).collect())
            .unwrap_or_default()
    }

    fn emit(&mut self, id: NodeId, event: SceneEvent) {
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        for listener in &node.listeners {
            if let Some(queue) = self.queues.get_mut(listener) {
                queue.push_back(event);
            }
        }
    }

    fn emit_changed(&mut self, id: NodeId, change: NodeChange) {
        self.emit(id, SceneEvent::NodeChanged { node: id, change });
    }
}

/// Mutable access to one node through its graph.
pub struct NodeMut<'a> {
    graph: &'a mut SceneGraph,
    id: NodeId,
}

impl NodeMut<'_> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    fn apply(&mut self, change: NodeChange, f: impl FnOnce(&mut SceneNode)) -> &mut Self {
        if let Some(node) = self.graph.nodes.get_mut(&self.id) {
            f(node);
            if change == NodeChange::Transform {
                node.local_dirty = true;
            }
            self.graph.emit_changed(self.id, change);
        }
        self
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> &mut Self {
        let name = name.into();
        self.apply(NodeChange::Name, |node| node.name = name)
    }

    pub fn set_kind(&mut self, kind: NodeKind) -> &mut Self {
        self.apply(NodeChange::Kind, |node| node.kind = kind)
    }

    pub fn set_position(&mut self, position: Vector3<f32>) -> &mut Self {
        self.apply(NodeChange::Transform, |node| node.position = position)
    }

    pub fn set_rotation(&mut self, rotation: Quaternion<f32>) -> &mut Self {
        self.apply(NodeChange::Transform, |node| node.rotation = rotation)
    }

    /// Replaces the rotation with `Rx(x) * Ry(y) * Rz(z)`, angles in radians.
    ///
    /// This overwrites; it does not compose with the current rotation.
    pub fn set_rotation_euler(&mut self, x: f32, y: f32, z: f32) -> &mut Self {
        let rotation = Quaternion::from_angle_x(Rad(x))
            * Quaternion::from_angle_y(Rad(y))
            * Quaternion::from_angle_z(Rad(z));
        self.set_rotation(rotation)
    }

    /// Zero components are accepted and yield a degenerate transform.
    pub fn set_scale(&mut self, scale: Vector3<f32>) -> &mut Self {
        self.apply(NodeChange::Transform, |node| node.scale = scale)
    }

    /// Emits a selection event only when the flag actually changes.
    pub fn set_selected(&mut self, selected: bool) -> &mut Self {
        let changed = match self.graph.nodes.get_mut(&self.id) {
            Some(node) if node.selected != selected => {
                node.selected = selected;
                true
            }
            _ => false,
        };
        if changed {
            let event = SceneEvent::SelectionChanged { node: self.id, selected };
            self.graph.emit(self.id, event);
        }
        self
    }

    pub fn attach_mesh(&mut self, mesh: MeshId) -> &mut Self {
        self.apply(NodeChange::Meshes, |node| node.meshes.push(mesh))
    }

    pub fn detach_mesh(&mut self, mesh: MeshId) -> &mut Self {
        let removed = self.graph.nodes.get_mut(&self.id).is_some_and(|node| {
            let before = node.meshes.len();
            node.meshes.retain(|m| *m != mesh);
            node.meshes.len() != before
        });
        if removed {
            self.graph.emit_changed(self.id, NodeChange::Meshes);
        }
        self
    }
}
