//! Node ↔ color id bookkeeping for color-coded picking.
//!
//! Each registered node gets a 24-bit id drawn into the pick target as an
//! RGB color. Id 0 is the cleared background. Ids increase monotonically
//! and are never handed out twice, even after the node is unregistered.

use std::collections::HashMap;

use crate::gfx::{
    gizmos::TransformMode,
    scene::{NodeId, SceneGraph},
};

/// Color id of pixels no registered node covered.
pub const BACKGROUND_ID: u32 = 0;

/// Largest id that fits in 8-bit RGB.
pub const MAX_COLOR_ID: u32 = 0x00FF_FFFF;

/// Splits an id into `(r, g, b)` bytes, red holding the low byte.
pub fn encode_color_id(id: u32) -> [u8; 3] {
    [
        (id & 0xFF) as u8,
        ((id >> 8) & 0xFF) as u8,
        ((id >> 16) & 0xFF) as u8,
    ]
}

/// Inverse of [`encode_color_id`].
pub fn decode_color_id(rgb: [u8; 3]) -> u32 {
    rgb[0] as u32 | (rgb[1] as u32) << 8 | (rgb[2] as u32) << 16
}

/// The id as a normalized color for the pick shader.
pub fn color_id_to_rgb(id: u32) -> [f32; 3] {
    encode_color_id(id).map(|c| c as f32 / 255.0)
}

/// What a pickable node is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickRole {
    SceneObject,
    /// A handle of the rig for this transform mode.
    Gizmo(TransformMode),
}

#[derive(Debug)]
pub struct PickRegistry {
    node_to_color: HashMap<NodeId, u32>,
    color_to_node: HashMap<u32, NodeId>,
    roles: HashMap<NodeId, PickRole>,
    next_color_id: u32,
}

impl PickRegistry {
    pub fn new() -> Self {
        Self {
            node_to_color: HashMap::new(),
            color_to_node: HashMap::new(),
            roles: HashMap::new(),
            next_color_id: 1,
        }
    }

    /// Assigns the next color id to `node`.
    ///
    /// Only nodes that exist and carry at least one mesh are registered, and
    /// only once. Returns the node's id if it is (now) registered.
    pub fn register(&mut self, graph: &SceneGraph, node: NodeId, role: PickRole) -> Option<u32> {
        if let Some(id) = self.node_to_color.get(&node) {
            return Some(*id);
        }
        if !graph.node(node).is_some_and(|n| n.has_meshes()) {
            return None;
        }
        if self.next_color_id > MAX_COLOR_ID {
            log::warn!("Color id space exhausted, {} will not be pickable", node);
            return None;
        }

        let id = self.next_color_id;
        self.next_color_id += 1;
        self.node_to_color.insert(node, id);
        self.color_to_node.insert(id, node);
        self.roles.insert(node, role);
        log::debug!("Registered {} as color id {} ({:?})", node, id, role);
        Some(id)
    }

    /// Registers every mesh-bearing node below `root`.
    ///
    /// # Returns
    /// Number of nodes newly registered
    pub fn register_subtree(&mut self, graph: &SceneGraph, root: NodeId, role: PickRole) -> usize {
        let mut added = 0;
        for node in graph.descendants(root) {
            if !self.is_registered(node) && self.register(graph, node, role).is_some() {
                added += 1;
            }
        }
        added
    }

    /// Forgets `node`. Its id is retired, not recycled.
    pub fn unregister(&mut self, node: NodeId) -> bool {
        let Some(id) = self.node_to_color.remove(&node) else {
            return false;
        };
        self.color_to_node.remove(&id);
        self.roles.remove(&node);
        true
    }

    pub fn is_registered(&self, node: NodeId) -> bool {
        self.node_to_color.contains_key(&node)
    }

    pub fn color_id(&self, node: NodeId) -> Option<u32> {
        self.node_to_color.get(&node).copied()
    }

    pub fn role(&self, node: NodeId) -> Option<PickRole> {
        self.roles.get(&node).copied()
    }

    /// Node and role behind a decoded id. Background and unknown ids give `None`.
    pub fn resolve(&self, color_id: u32) -> Option<(NodeId, PickRole)> {
        let node = *self.color_to_node.get(&color_id)?;
        Some((node, self.role(node)?))
    }

    pub fn len(&self) -> usize {
        self.node_to_color.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_to_color.is_empty()
    }
}

impl Default for PickRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::{geometry::generate_cube, scene::Scene};
    use std::collections::HashSet;

    #[test]
    fn test_encode_layout() {
        assert_eq!(encode_color_id(1), [1, 0, 0]);
        assert_eq!(encode_color_id(0x0102_03), [3, 2, 1]);
        assert_eq!(encode_color_id(MAX_COLOR_ID), [255, 255, 255]);
        assert_eq!(decode_color_id([0, 0, 0]), BACKGROUND_ID);
    }

    #[test]
    fn test_decode_inverts_encode() {
        for id in 1..=MAX_COLOR_ID {
            assert_eq!(decode_color_id(encode_color_id(id)), id);
        }
    }

    #[test]
    fn test_normalized_color() {
        assert_eq!(color_id_to_rgb(255), [1.0, 0.0, 0.0]);
        assert_eq!(color_id_to_rgb(0), [0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_registered_ids_are_unique_and_nonzero() {
        let mut scene = Scene::new("registry");
        let root = scene.root();
        let nodes: Vec<_> = (0..20)
            .map(|i| scene.add_geometry(root, format!("cube{}", i), &generate_cube()))
            .collect();

        let mut registry = PickRegistry::new();
        assert_eq!(registry.register_subtree(&scene.graph, root, PickRole::SceneObject), 20);

        let ids: HashSet<u32> = nodes.iter().filter_map(|n| registry.color_id(*n)).collect();
        assert_eq!(ids.len(), 20);
        assert!(!ids.contains(&BACKGROUND_ID));
        for node in nodes {
            let id = registry.color_id(node).unwrap();
            assert_eq!(registry.resolve(id), Some((node, PickRole::SceneObject)));
        }
    }

    #[test]
    fn test_meshless_nodes_are_skipped() {
        let mut scene = Scene::new("registry");
        let root = scene.root();
        let empty = scene.add_node(root, "group");
        let mut registry = PickRegistry::new();
        assert_eq!(registry.register(&scene.graph, empty, PickRole::SceneObject), None);
        assert_eq!(registry.register(&scene.graph, root, PickRole::SceneObject), None);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_register_twice_keeps_first_id() {
        let mut scene = Scene::new("registry");
        let root = scene.root();
        let cube = scene.add_geometry(root, "cube", &generate_cube());
        let mut registry = PickRegistry::new();
        let first = registry.register(&scene.graph, cube, PickRole::SceneObject);
        let second = registry.register(&scene.graph, cube, PickRole::Gizmo(TransformMode::Scale));
        assert_eq!(first, second);
        assert_eq!(registry.role(cube), Some(PickRole::SceneObject));
    }

    #[test]
    fn test_unregistered_ids_are_not_reused() {
        let mut scene = Scene::new("registry");
        let root = scene.root();
        let a = scene.add_geometry(root, "a", &generate_cube());
        let b = scene.add_geometry(root, "b", &generate_cube());
        let mut registry = PickRegistry::new();

        let id_a = registry.register(&scene.graph, a, PickRole::SceneObject).unwrap();
        assert!(registry.unregister(a));
        assert!(registry.resolve(id_a).is_none());

        let id_b = registry.register(&scene.graph, b, PickRole::SceneObject).unwrap();
        assert_ne!(id_a, id_b);
        assert!(!registry.unregister(a));
    }

    #[test]
    fn test_background_and_unknown_resolve_to_none() {
        let registry = PickRegistry::new();
        assert!(registry.resolve(BACKGROUND_ID).is_none());
        assert!(registry.resolve(12345).is_none());
    }
}
