//! # Procedural Geometry Generation
//!
//! Closed, outward-facing meshes for the gizmo rigs and for test scenes.
//! Every generator emits counter-clockwise triangles when viewed from
//! outside, which single-sided ray picking relies on.
//!
//! ## Supported Primitives
//!
//! - **Box / Cube**: axis-aligned box centered at the origin
//! - **Arrow**: cylindrical shaft with a cone head, for translate handles
//! - **Ring**: torus around an axis, for rotate handles
//! - **Scale handle**: shaft with a cube tip, for scale handles
//!
//! ## Usage
//!
//! ```no_run
//! use kelpie::gfx::geometry::{generate_arrow, generate_cube, Axis};
//!
//! let cube = generate_cube();
//! let x_arrow = generate_arrow(Axis::X, 1.0, 24);
//! assert_eq!(cube.triangle_count(), 12);
//! ```

pub mod primitives;

pub use primitives::*;

use cgmath::{InnerSpace, Matrix4, Transform, Vector3};

use crate::gfx::scene::vertex::Vertex3D;

/// Generated geometry ready to become a [`Mesh`](crate::gfx::scene::mesh::Mesh).
#[derive(Debug, Clone, Default)]
pub struct GeometryData {
    /// Vertex positions (x, y, z)
    pub vertices: Vec<[f32; 3]>,
    /// Vertex normals (x, y, z)
    pub normals: Vec<[f32; 3]>,
    /// Triangle indices (counter-clockwise winding)
    pub indices: Vec<u32>,
}

impl GeometryData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Appends another piece of geometry, offsetting its indices.
    pub fn append(&mut self, other: &GeometryData) {
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.normals.extend_from_slice(&other.normals);
        self.indices.extend(other.indices.iter().map(|i| i + base));
    }

    /// Applies an affine transform in place. Normals are rotated with the
    /// same matrix, so only use rigid transforms or uniform scales here.
    pub fn transform(mut self, matrix: Matrix4<f32>) -> Self {
        for vertex in &mut self.vertices {
            let p = matrix.transform_point(cgmath::Point3::from(*vertex));
            *vertex = p.into();
        }
        for normal in &mut self.normals {
            let n = matrix.transform_vector(Vector3::from(*normal));
            *normal = if n.magnitude2() > 0.0 { n.normalize().into() } else { *normal };
        }
        self
    }

    /// Replaces normals with area-weighted vertex normals. Triangles with an
    /// out-of-range index are skipped.
    pub fn recompute_normals(&mut self) {
        let mut normals = vec![Vector3::new(0.0f32, 0.0, 0.0); self.vertices.len()];

        for triangle in self.indices.chunks_exact(3) {
            let [i0, i1, i2] = [triangle[0] as usize, triangle[1] as usize, triangle[2] as usize];
            let (Some(&v0), Some(&v1), Some(&v2)) =
                (self.vertices.get(i0), self.vertices.get(i1), self.vertices.get(i2))
            else {
                continue;
            };
            let (v0, v1, v2) = (Vector3::from(v0), Vector3::from(v1), Vector3::from(v2));
            let face_normal = (v1 - v0).cross(v2 - v0);
            for i in [i0, i1, i2] {
                normals[i] += face_normal;
            }
        }

        self.normals = normals
            .into_iter()
            .map(|n| {
                if n.magnitude2() > 0.0 {
                    n.normalize().into()
                } else {
                    [0.0, 1.0, 0.0]
                }
            })
            .collect();
    }

    /// Flat `x, y, z` position list, the layout picking reads.
    pub fn flat_positions(&self) -> Vec<f32> {
        self.vertices.iter().flatten().copied().collect()
    }

    /// Interleaves positions and normals into GPU vertices.
    pub fn to_vertices(&self) -> Vec<Vertex3D> {
        self.vertices
            .iter()
            .enumerate()
            .map(|(i, position)| Vertex3D {
                position: *position,
                normal: self.normals.get(i).copied().unwrap_or([0.0, 1.0, 0.0]),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_offsets_indices() {
        let mut a = generate_cube();
        let b = generate_cube();
        a.append(&b);
        assert_eq!(a.vertex_count(), 48);
        assert_eq!(a.triangle_count(), 24);
        assert_eq!(*a.indices.iter().max().unwrap(), 47);
    }

    #[test]
    fn test_translate_moves_vertices() {
        let cube = generate_cube().transform(Matrix4::from_translation(Vector3::new(2.0, 0.0, 0.0)));
        assert!(cube.vertices.iter().all(|v| v[0] >= 1.5 && v[0] <= 2.5));
    }

    #[test]
    fn test_recompute_normals_skips_out_of_range_triangles() {
        let mut tri = GeometryData {
            vertices: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            normals: Vec::new(),
            indices: vec![0, 1, 2, 0, 1, 9],
        };
        tri.recompute_normals();
        assert_eq!(tri.normals, vec![[0.0, 0.0, 1.0]; 3]);
    }

    #[test]
    fn test_flat_positions_layout() {
        let cube = generate_cube();
        let flat = cube.flat_positions();
        assert_eq!(flat.len(), cube.vertex_count() * 3);
        assert_eq!(&flat[0..3], &cube.vertices[0]);
    }
}
