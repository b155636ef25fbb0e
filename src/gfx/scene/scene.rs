use std::path::Path;

use crate::gfx::geometry::GeometryData;

use super::{
    graph::SceneGraph,
    mesh::{Mesh, MeshLibrary},
    node::NodeId,
};

/// A named scene: its graph, the root node, and the meshes its nodes reference.
#[derive(Debug)]
pub struct Scene {
    pub name: String,
    pub graph: SceneGraph,
    pub meshes: MeshLibrary,
    root: NodeId,
}

impl Scene {
    pub fn new(name: impl Into<String>) -> Self {
        let mut graph = SceneGraph::new();
        let root = graph.create_node("root");
        Self {
            name: name.into(),
            graph,
            meshes: MeshLibrary::new(),
            root,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Creates an empty node under `parent`.
    pub fn add_node(&mut self, parent: NodeId, name: impl Into<String>) -> NodeId {
        let id = self.graph.create_node(name);
        self.graph.add_child(parent, id);
        id
    }

    /// Creates a node under `parent` carrying a single mesh built from `geometry`.
    pub fn add_geometry(&mut self, parent: NodeId, name: impl Into<String>, geometry: &GeometryData) -> NodeId {
        let name = name.into();
        let mesh = self.meshes.insert(Mesh::from_geometry(name.clone(), geometry));
        let id = self.add_node(parent, name);
        if let Some(mut node) = self.graph.node_mut(id) {
            node.attach_mesh(mesh);
        }
        id
    }

    /// Imports an OBJ file as one node under `parent` holding every model's mesh.
    pub fn add_obj(&mut self, parent: NodeId, path: impl AsRef<Path>) -> anyhow::Result<NodeId> {
        let path = path.as_ref();
        let mesh_ids = self.meshes.load_obj(path)?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "model".to_string());
        let id = self.add_node(parent, name);
        if let Some(mut node) = self.graph.node_mut(id) {
            for mesh in mesh_ids {
                node.attach_mesh(mesh);
            }
        }
        Ok(id)
    }

    /// Refreshes every world matrix below the root.
    pub fn update_transforms(&mut self) {
        self.graph.update_world_transformation(self.root, &mut self.meshes);
    }

    pub fn upload_meshes(&mut self, device: &wgpu::Device) {
        self.meshes.upload_all(device);
    }

    /// Destroys `id`'s subtree and the meshes only it used. The root itself
    /// cannot be destroyed.
    pub fn destroy(&mut self, id: NodeId) -> Vec<NodeId> {
        if id == self.root {
            log::warn!("Ignoring request to destroy the scene root of '{}'", self.name);
            return Vec::new();
        }
        self.graph.destroy(id, &mut self.meshes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::geometry::generate_cube;

    #[test]
    fn test_add_geometry_attaches_mesh() {
        let mut scene = Scene::new("test");
        let root = scene.root();
        let cube = scene.add_geometry(root, "cube", &generate_cube());
        let node = scene.graph.node(cube).unwrap();
        assert_eq!(node.parent(), Some(root));
        assert_eq!(node.meshes().len(), 1);
        assert_eq!(scene.graph.find_by_name(root, "cube"), Some(cube));
    }

    #[test]
    fn test_root_is_not_destroyed() {
        let mut scene = Scene::new("test");
        let root = scene.root();
        assert!(scene.destroy(root).is_empty());
        assert!(scene.graph.contains(root));
    }

    #[test]
    fn test_destroy_returns_mesh_library_to_baseline() {
        let mut scene = Scene::new("test");
        let root = scene.root();
        let keep = scene.add_geometry(root, "keep", &generate_cube());
        for i in 0..100 {
            let node = scene.add_geometry(root, format!("temp{}", i), &generate_cube());
            scene.destroy(node);
        }
        assert_eq!(scene.meshes.len(), 1);
        assert_eq!(scene.graph.node(root).unwrap().children(), &[keep]);
    }
}
