//! # Primitive Shape Generation
//!
//! Solids of revolution are built with [`lathe`] around +Z and then rotated
//! onto the requested axis, which keeps the winding outward-facing.

use std::f32::consts::{FRAC_PI_2, PI};

use cgmath::{Matrix4, Rad, Vector3};

use super::GeometryData;

/// Principal axis a handle points along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn unit(self) -> Vector3<f32> {
        match self {
            Axis::X => Vector3::unit_x(),
            Axis::Y => Vector3::unit_y(),
            Axis::Z => Vector3::unit_z(),
        }
    }

    /// Rotation taking +Z onto this axis.
    fn from_z(self) -> Matrix4<f32> {
        match self {
            Axis::X => Matrix4::from_angle_y(Rad(FRAC_PI_2)),
            Axis::Y => Matrix4::from_angle_x(Rad(-FRAC_PI_2)),
            Axis::Z => Matrix4::from_scale(1.0),
        }
    }
}

/// Axis-aligned box centered at the origin.
pub fn generate_box(half_extents: Vector3<f32>) -> GeometryData {
    let mut data = GeometryData::new();

    // (face normal, in-face "up"); the in-face "right" is up x normal
    let faces = [
        (Vector3::unit_z(), Vector3::unit_y()),
        (-Vector3::unit_z(), Vector3::unit_y()),
        (Vector3::unit_x(), Vector3::unit_y()),
        (-Vector3::unit_x(), Vector3::unit_y()),
        (Vector3::unit_y(), Vector3::unit_z()),
        (-Vector3::unit_y(), Vector3::unit_z()),
    ];

    for (normal, up) in faces {
        let right = up.cross(normal);
        let base = data.vertices.len() as u32;
        for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
            let corner = normal + right * su + up * sv;
            data.vertices.push([
                corner.x * half_extents.x,
                corner.y * half_extents.y,
                corner.z * half_extents.z,
            ]);
            data.normals.push(normal.into());
        }
        data.indices
            .extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }

    data
}

/// Unit cube with vertices from -0.5 to 0.5 on all axes.
pub fn generate_cube() -> GeometryData {
    generate_box(Vector3::new(0.5, 0.5, 0.5))
}

/// Revolves a `(radius, z)` profile around +Z.
///
/// Walking the profile with increasing `z` on the outer side yields
/// outward-facing triangles. Profile points with zero radius collapse to the
/// axis and their degenerate triangles are skipped.
pub fn lathe(profile: &[(f32, f32)], segments: u32) -> GeometryData {
    let mut data = GeometryData::new();
    let segs = segments.max(3);
    let ring = segs + 1;

    for &(radius, z) in profile {
        for i in 0..=segs {
            let angle = i as f32 * 2.0 * PI / segs as f32;
            data.vertices.push([radius * angle.cos(), radius * angle.sin(), z]);
        }
    }

    for (p, pair) in profile.windows(2).enumerate() {
        let (r0, r1) = (pair[0].0, pair[1].0);
        let row = p as u32 * ring;
        for i in 0..segs {
            let a = row + i;
            let b = row + i + 1;
            let c = row + ring + i + 1;
            let d = row + ring + i;
            if r0 > 0.0 {
                data.indices.extend_from_slice(&[a, b, d]);
            }
            if r1 > 0.0 {
                data.indices.extend_from_slice(&[b, c, d]);
            }
        }
    }

    data.recompute_normals();
    data
}

/// Arrow from the origin to `length` along `axis`: a shaft and a cone head.
pub fn generate_arrow(axis: Axis, length: f32, segments: u32) -> GeometryData {
    let shaft = length * 0.02;
    let head = length * 0.07;
    let neck = length * 0.8;
    let profile = [
        (0.0, 0.0),
        (shaft, 0.0),
        (shaft, neck),
        (head, neck),
        (0.0, length),
    ];
    lathe(&profile, segments).transform(axis.from_z())
}

/// Torus of radius `radius` lying in the plane perpendicular to `axis`.
pub fn generate_ring(axis: Axis, radius: f32, tube_radius: f32, segments: u32) -> GeometryData {
    let tube_segs = (segments / 3).max(6);
    let profile: Vec<(f32, f32)> = (0..=tube_segs)
        .map(|i| {
            let theta = i as f32 * 2.0 * PI / tube_segs as f32;
            (radius + tube_radius * theta.cos(), tube_radius * theta.sin())
        })
        .collect();
    lathe(&profile, segments).transform(axis.from_z())
}

/// Shaft along `axis` ending in a small cube, the scale handle shape.
pub fn generate_scale_handle(axis: Axis, length: f32, segments: u32) -> GeometryData {
    let shaft = length * 0.02;
    let tip = length * 0.06;
    let neck = length - 2.0 * tip;
    let mut data = lathe(
        &[(0.0, 0.0), (shaft, 0.0), (shaft, neck), (0.0, neck)],
        segments,
    );
    let cube = generate_box(Vector3::new(tip, tip, tip))
        .transform(Matrix4::from_translation(Vector3::new(0.0, 0.0, length - tip)));
    data.append(&cube);
    data.transform(axis.from_z())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::InnerSpace;

    /// Every triangle's normal must point away from the given center.
    fn assert_outward(data: &GeometryData, center: Vector3<f32>) {
        for tri in data.indices.chunks_exact(3) {
            let v0 = Vector3::from(data.vertices[tri[0] as usize]);
            let v1 = Vector3::from(data.vertices[tri[1] as usize]);
            let v2 = Vector3::from(data.vertices[tri[2] as usize]);
            let n = (v1 - v0).cross(v2 - v0);
            if n.magnitude2() < 1e-12 {
                continue;
            }
            let centroid = (v0 + v1 + v2) / 3.0;
            assert!(n.dot(centroid - center) > 0.0, "inward triangle {:?}", tri);
        }
    }

    #[test]
    fn test_cube_generation() {
        let cube = generate_cube();
        assert_eq!(cube.vertex_count(), 24);
        assert_eq!(cube.triangle_count(), 12);
        assert_outward(&cube, Vector3::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn test_box_extents() {
        let data = generate_box(Vector3::new(1.0, 2.0, 3.0));
        let max_y = data.vertices.iter().map(|v| v[1]).fold(f32::MIN, f32::max);
        let min_z = data.vertices.iter().map(|v| v[2]).fold(f32::MAX, f32::min);
        assert_eq!(max_y, 2.0);
        assert_eq!(min_z, -3.0);
    }

    #[test]
    fn test_lathe_cylinder_faces_outward() {
        let cylinder = lathe(&[(0.0, -1.0), (1.0, -1.0), (1.0, 1.0), (0.0, 1.0)], 16);
        assert_outward(&cylinder, Vector3::new(0.0, 0.0, 0.0));
    }

    #[test]
    fn test_arrow_points_along_axis() {
        for axis in Axis::ALL {
            let arrow = generate_arrow(axis, 1.0, 12);
            let reach = arrow
                .vertices
                .iter()
                .map(|v| Vector3::from(*v).dot(axis.unit()))
                .fold(f32::MIN, f32::max);
            assert!((reach - 1.0).abs() < 1e-5, "{:?} reaches {}", axis, reach);
        }
    }

    #[test]
    fn test_ring_lies_around_axis() {
        let ring = generate_ring(Axis::Y, 1.0, 0.05, 24);
        for v in &ring.vertices {
            assert!(v[1].abs() <= 0.05 + 1e-5);
            let planar = (v[0] * v[0] + v[2] * v[2]).sqrt();
            assert!(planar >= 0.95 - 1e-4 && planar <= 1.05 + 1e-4);
        }
    }
}
