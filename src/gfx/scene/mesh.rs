//! Triangle meshes and the library that owns them.
//!
//! Scene nodes hold [`MeshId`]s only. The [`MeshLibrary`] owns the vertex
//! data and the lazily created GPU buffers.

use std::{collections::HashMap, path::Path};

use anyhow::Context;
use cgmath::{Matrix4, SquareMatrix, Vector3};
use wgpu::util::DeviceExt;

use super::vertex::Vertex3D;
use crate::gfx::geometry::GeometryData;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshId(u32);

impl std::fmt::Display for MeshId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "mesh#{}", self.0)
    }
}

pub struct Mesh {
    name: String,
    vertices: Vec<Vertex3D>,
    indices: Vec<u32>,
    model_matrix: Matrix4<f32>,
    vertex_buffer: Option<wgpu::Buffer>,
    index_buffer: Option<wgpu::Buffer>,
    index_count: u32,
}

impl Mesh {
    /// Builds a mesh from flat `x, y, z` positions and triangle indices.
    ///
    /// Normals are recomputed when `normals` does not match `positions`.
    pub fn new(name: impl Into<String>, positions: &[f32], normals: &[f32], indices: Vec<u32>) -> Self {
        let geometry = if normals.len() == positions.len() {
            GeometryData {
                vertices: positions.chunks_exact(3).map(|p| [p[0], p[1], p[2]]).collect(),
                normals: normals.chunks_exact(3).map(|n| [n[0], n[1], n[2]]).collect(),
                indices,
            }
        } else {
            let mut geometry = GeometryData {
                vertices: positions.chunks_exact(3).map(|p| [p[0], p[1], p[2]]).collect(),
                normals: Vec::new(),
                indices,
            };
            geometry.recompute_normals();
            geometry
        };
        Self::from_geometry(name, &geometry)
    }

    pub fn from_geometry(name: impl Into<String>, geometry: &GeometryData) -> Self {
        Self {
            name: name.into(),
            vertices: geometry.to_vertices(),
            indices: geometry.indices.clone(),
            model_matrix: Matrix4::identity(),
            vertex_buffer: None,
            index_buffer: None,
            index_count: geometry.indices.len() as u32,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn vertices(&self) -> &[Vertex3D] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Local-space triangles, three consecutive indices at a time.
    /// Triangles with an out-of-range index are skipped.
    pub fn triangles(&self) -> impl Iterator<Item = [Vector3<f32>; 3]> + '_ {
        self.indices.chunks_exact(3).filter_map(move |tri| {
            let a = self.vertices.get(tri[0] as usize)?;
            let b = self.vertices.get(tri[1] as usize)?;
            let c = self.vertices.get(tri[2] as usize)?;
            Some([a.position.into(), b.position.into(), c.position.into()])
        })
    }

    /// World transform of the owning node, written by the scene update pass.
    pub fn model_matrix(&self) -> Matrix4<f32> {
        self.model_matrix
    }

    pub fn set_model_matrix(&mut self, matrix: Matrix4<f32>) {
        self.model_matrix = matrix;
    }

    /// Creates the vertex and index buffers if they do not exist yet.
    pub fn upload(&mut self, device: &wgpu::Device) {
        if self.is_uploaded() {
            return;
        }
        self.vertex_buffer = Some(device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Vertex Buffer", self.name)),
            contents: bytemuck::cast_slice(&self.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        }));
        self.index_buffer = Some(device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Index Buffer", self.name)),
            contents: bytemuck::cast_slice(&self.indices),
            usage: wgpu::BufferUsages::INDEX,
        }));
    }

    pub fn is_uploaded(&self) -> bool {
        self.vertex_buffer.is_some() && self.index_buffer.is_some()
    }

    /// Drops the GPU buffers. The CPU copy stays usable for ray picking.
    pub fn release_gpu(&mut self) {
        if let Some(buffer) = self.vertex_buffer.take() {
            buffer.destroy();
        }
        if let Some(buffer) = self.index_buffer.take() {
            buffer.destroy();
        }
    }
}

impl std::fmt::Debug for Mesh {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mesh")
            .field("name", &self.name)
            .field("vertices", &self.vertices.len())
            .field("triangles", &self.triangle_count())
            .field("uploaded", &self.is_uploaded())
            .finish()
    }
}

/// Draws meshes whose buffers have been uploaded; others are skipped.
pub trait DrawMesh<'a> {
    fn draw_mesh(&mut self, mesh: &'a Mesh);
}

impl<'a, 'b> DrawMesh<'b> for wgpu::RenderPass<'a>
where
    'b: 'a,
{
    fn draw_mesh(&mut self, mesh: &'b Mesh) {
        let (Some(vertex_buffer), Some(index_buffer)) = (&mesh.vertex_buffer, &mesh.index_buffer) else {
            return;
        };
        self.set_vertex_buffer(0, vertex_buffer.slice(..));
        self.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        self.draw_indexed(0..mesh.index_count, 0, 0..1);
    }
}

#[derive(Debug, Default)]
pub struct MeshLibrary {
    meshes: HashMap<MeshId, Mesh>,
    next_id: u32,
}

impl MeshLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, mesh: Mesh) -> MeshId {
        let id = MeshId(self.next_id);
        self.next_id += 1;
        self.meshes.insert(id, mesh);
        id
    }

    pub fn get(&self, id: MeshId) -> Option<&Mesh> {
        self.meshes.get(&id)
    }

    pub fn get_mut(&mut self, id: MeshId) -> Option<&mut Mesh> {
        self.meshes.get_mut(&id)
    }

    pub fn remove(&mut self, id: MeshId) -> Option<Mesh> {
        let mut mesh = self.meshes.remove(&id)?;
        mesh.release_gpu();
        Some(mesh)
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    pub fn upload_all(&mut self, device: &wgpu::Device) {
        for mesh in self.meshes.values_mut() {
            mesh.upload(device);
        }
    }

    /// Imports every model of an OBJ file, triangulated with a single index stream.
    ///
    /// # Returns
    /// The ids of the inserted meshes, in file order
    pub fn load_obj(&mut self, path: impl AsRef<Path>) -> anyhow::Result<Vec<MeshId>> {
        let path = path.as_ref();
        let (models, _materials) = tobj::load_obj(
            path,
            &tobj::LoadOptions {
                triangulate: true,
                single_index: true,
                ..Default::default()
            },
        )
        .with_context(|| format!("failed to load OBJ file {}", path.display()))?;

        let ids = models
            .into_iter()
            .map(|model| {
                let mesh = &model.mesh;
                self.insert(Mesh::new(model.name, &mesh.positions, &mesh.normals, mesh.indices.clone()))
            })
            .collect::<Vec<_>>();

        log::info!("Loaded {} mesh(es) from {}", ids.len(), path.display());
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::geometry::generate_cube;

    #[test]
    fn test_triangles_skip_bad_indices() {
        let mesh = Mesh::new(
            "tri",
            &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            &[],
            vec![0, 1, 2, 0, 1, 9],
        );
        let tris: Vec<_> = mesh.triangles().collect();
        assert_eq!(tris.len(), 1);
        assert_eq!(tris[0][1], Vector3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_normals_recomputed_when_missing() {
        let mesh = Mesh::new(
            "tri",
            &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
            &[],
            vec![0, 1, 2],
        );
        assert_eq!(mesh.vertices()[0].normal, [0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_library_ids_are_distinct() {
        let mut library = MeshLibrary::new();
        let a = library.insert(Mesh::from_geometry("a", &generate_cube()));
        let b = library.insert(Mesh::from_geometry("b", &generate_cube()));
        assert_ne!(a, b);
        assert_eq!(library.get(b).map(|m| m.name()), Some("b"));
        assert!(library.remove(a).is_some());
        assert!(library.get(a).is_none());
        assert_eq!(library.len(), 1);
    }

    #[test]
    fn test_missing_obj_reports_path() {
        let mut library = MeshLibrary::new();
        let err = library.load_obj("/no/such/model.obj").unwrap_err();
        assert!(format!("{:#}", err).contains("/no/such/model.obj"));
    }
}
