//! CPU ray-cast picking against mesh triangles.

use std::collections::HashSet;

use cgmath::{EuclideanSpace, InnerSpace, Matrix4, Point3, SquareMatrix, Transform, Vector3, Vector4};

use crate::gfx::{
    camera::CameraView,
    scene::{MeshId, NodeId, Scene},
    viewport::Viewport,
};

/// A 3D ray for intersection testing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Ray origin point in world space
    pub origin: Vector3<f32>,
    /// Ray direction (normalized)
    pub direction: Vector3<f32>,
}

impl Ray {
    pub fn new(origin: Vector3<f32>, direction: Vector3<f32>) -> Self {
        Self {
            origin,
            direction: direction.normalize(),
        }
    }

    pub fn point_at(&self, t: f32) -> Vector3<f32> {
        self.origin + self.direction * t
    }

    /// Unprojects a screen position into a world-space ray from the camera.
    ///
    /// `x`/`y` are pixels with the origin at the top-left of the viewport.
    /// Returns `None` if the view or projection matrix is singular.
    pub fn from_screen(x: f32, y: f32, camera: &dyn CameraView, viewport: &Viewport) -> Option<Self> {
        let ndc_x = (2.0 * x) / viewport.width.max(1) as f32 - 1.0;
        let ndc_y = 1.0 - (2.0 * y) / viewport.height.max(1) as f32;
        let clip = Vector4::new(ndc_x, ndc_y, -1.0, 1.0);

        let mut eye = viewport.projection_matrix().invert()? * clip;
        eye.z = -1.0;
        eye.w = 0.0;

        let world = camera.view_matrix().invert()? * eye;
        Some(Self::new(camera.position(), world.truncate()))
    }
}

/// Barycentric hit on a single triangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriangleHit {
    pub t: f32,
    pub u: f32,
    pub v: f32,
}

/// Möller–Trumbore ray/triangle intersection.
///
/// Single-sided: triangles whose determinant is below `epsilon` (parallel or
/// seen from the back for counter-clockwise winding) are rejected. A hit
/// needs `u` in `[0, 1]`, `v >= 0`, `u + v <= 1` and `t > 0`.
pub fn intersect_triangle(
    ray: &Ray,
    v0: Vector3<f32>,
    v1: Vector3<f32>,
    v2: Vector3<f32>,
    epsilon: f32,
) -> Option<TriangleHit> {
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;
    let pvec = ray.direction.cross(edge2);
    let det = edge1.dot(pvec);
    if det < epsilon {
        return None;
    }
    let inv_det = 1.0 / det;

    let tvec = ray.origin - v0;
    let u = tvec.dot(pvec) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let qvec = tvec.cross(edge1);
    let v = ray.direction.dot(qvec) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = edge2.dot(qvec) * inv_det;
    (t > 0.0).then_some(TriangleHit { t, u, v })
}

/// Closest intersected mesh, reported with the node that carries it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub node: NodeId,
    pub mesh: MeshId,
    pub distance: f32,
    pub point: Vector3<f32>,
}

/// Object picker for 3D mouse selection by ray casting.
#[derive(Debug, Clone)]
pub struct RayPicker {
    epsilon: f32,
}

impl RayPicker {
    pub fn new(epsilon: f32) -> Self {
        Self { epsilon }
    }

    /// Casts a ray through `(x, y)` and returns the closest hit below `roots`.
    ///
    /// World matrices are read from the scene's cache, so run the transform
    /// update before picking. Nodes reachable from several roots are tested
    /// once. On equal distances the first node in traversal order wins.
    pub fn pick(
        &self,
        scene: &Scene,
        roots: &[NodeId],
        camera: &dyn CameraView,
        viewport: &Viewport,
        x: f32,
        y: f32,
    ) -> Option<RayHit> {
        let ray = Ray::from_screen(x, y, camera, viewport)?;
        self.cast(scene, roots, &ray)
    }

    /// Same as [`pick`](Self::pick) with an explicit world-space ray.
    pub fn cast(&self, scene: &Scene, roots: &[NodeId], ray: &Ray) -> Option<RayHit> {
        let mut visited = HashSet::new();
        let mut closest: Option<RayHit> = None;

        for &root in roots {
            for id in scene.graph.descendants(root) {
                if !visited.insert(id) {
                    continue;
                }
                let Some(node) = scene.graph.node(id) else {
                    continue;
                };
                let world = node.world_matrix();
                for &mesh_id in node.meshes() {
                    let Some(mesh) = scene.meshes.get(mesh_id) else {
                        continue;
                    };
                    if let Some(t) = self.closest_on_mesh(ray, mesh.triangles(), &world) {
                        if closest.map_or(true, |hit| t < hit.distance) {
                            closest = Some(RayHit {
                                node: id,
                                mesh: mesh_id,
                                distance: t,
                                point: ray.point_at(t),
                            });
                        }
                    }
                }
            }
        }

        if let Some(hit) = &closest {
            log::debug!("Ray pick hit {} at distance {:.3}", hit.node, hit.distance);
        }
        closest
    }

    fn closest_on_mesh(
        &self,
        ray: &Ray,
        triangles: impl Iterator<Item = [Vector3<f32>; 3]>,
        world: &Matrix4<f32>,
    ) -> Option<f32> {
        let to_world = |v: Vector3<f32>| world.transform_point(Point3::from_vec(v)).to_vec();
        triangles
            .filter_map(|[a, b, c]| intersect_triangle(ray, to_world(a), to_world(b), to_world(c), self.epsilon))
            .map(|hit| hit.t)
            .fold(None, |best: Option<f32>, t| match best {
                Some(b) if b <= t => Some(b),
                _ => Some(t),
            })
    }
}

impl Default for RayPicker {
    fn default() -> Self {
        Self::new(1e-6)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::{camera::OrbitCamera, geometry::generate_cube};

    fn unit_triangle() -> [Vector3<f32>; 3] {
        [
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
        ]
    }

    #[test]
    fn test_triangle_hit() {
        let [a, b, c] = unit_triangle();
        let ray = Ray::new(Vector3::new(0.25, 0.25, 5.0), Vector3::new(0.0, 0.0, -1.0));
        let hit = intersect_triangle(&ray, a, b, c, 1e-6).unwrap();
        assert!((hit.t - 5.0).abs() < 1e-5);
        assert!((hit.u - 0.25).abs() < 1e-5);
        assert!((hit.v - 0.25).abs() < 1e-5);
    }

    #[test]
    fn test_triangle_miss_outside() {
        let [a, b, c] = unit_triangle();
        let ray = Ray::new(Vector3::new(10.0, 10.0, 5.0), Vector3::new(0.0, 0.0, -1.0));
        assert!(intersect_triangle(&ray, a, b, c, 1e-6).is_none());
    }

    #[test]
    fn test_back_face_is_culled() {
        let [a, b, c] = unit_triangle();
        let ray = Ray::new(Vector3::new(0.25, 0.25, -5.0), Vector3::new(0.0, 0.0, 1.0));
        assert!(intersect_triangle(&ray, a, b, c, 1e-6).is_none());
    }

    #[test]
    fn test_hit_behind_origin_is_rejected() {
        let [a, b, c] = unit_triangle();
        let ray = Ray::new(Vector3::new(0.25, 0.25, -5.0), Vector3::new(0.0, 0.0, -1.0));
        assert!(intersect_triangle(&ray, a, b, c, 1e-6).is_none());
    }

    #[test]
    fn test_parallel_ray_is_rejected() {
        let [a, b, c] = unit_triangle();
        let ray = Ray::new(Vector3::new(-1.0, 0.25, 0.0), Vector3::new(1.0, 0.0, 0.0));
        assert!(intersect_triangle(&ray, a, b, c, 1e-6).is_none());
    }

    #[test]
    fn test_center_ray_points_forward() {
        let camera = OrbitCamera::new(5.0, 0.0, 0.0, Vector3::new(0.0, 0.0, 0.0));
        let viewport = Viewport::new(800, 600);
        let ray = Ray::from_screen(400.0, 300.0, &camera, &viewport).unwrap();
        assert!((ray.origin - Vector3::new(0.0, 0.0, 5.0)).magnitude() < 1e-5);
        assert!((ray.direction - Vector3::new(0.0, 0.0, -1.0)).magnitude() < 1e-4);

        // Upper-left pixels aim up and to the left
        let corner = Ray::from_screen(0.0, 0.0, &camera, &viewport).unwrap();
        assert!(corner.direction.x < 0.0 && corner.direction.y > 0.0);
    }

    #[test]
    fn test_pick_closest_cube() {
        let mut scene = Scene::new("pick");
        let root = scene.root();
        let near = scene.add_geometry(root, "near", &generate_cube());
        let far = scene.add_geometry(root, "far", &generate_cube());
        scene.graph.node_mut(far).unwrap().set_position(Vector3::new(0.0, 0.0, -3.0));
        scene.update_transforms();

        let camera = OrbitCamera::new(5.0, 0.0, 0.0, Vector3::new(0.0, 0.0, 0.0));
        let viewport = Viewport::new(800, 600);
        let hit = RayPicker::default()
            .pick(&scene, &[root], &camera, &viewport, 400.0, 300.0)
            .unwrap();
        assert_eq!(hit.node, near);
        assert!((hit.distance - 4.5).abs() < 1e-3);
    }

    #[test]
    fn test_pick_follows_node_transform() {
        let mut scene = Scene::new("pick");
        let root = scene.root();
        let cube = scene.add_geometry(root, "cube", &generate_cube());
        scene.graph.node_mut(cube).unwrap().set_position(Vector3::new(3.0, 0.0, 0.0));
        scene.update_transforms();

        let straight = Ray::new(Vector3::new(0.0, 0.0, 5.0), Vector3::new(0.0, 0.0, -1.0));
        assert!(RayPicker::default().cast(&scene, &[root], &straight).is_none());

        let shifted = Ray::new(Vector3::new(3.0, 0.0, 5.0), Vector3::new(0.0, 0.0, -1.0));
        assert_eq!(RayPicker::default().cast(&scene, &[root], &shifted).map(|h| h.node), Some(cube));
    }

    #[test]
    fn test_zero_scale_node_is_unpickable() {
        let mut scene = Scene::new("pick");
        let root = scene.root();
        let cube = scene.add_geometry(root, "cube", &generate_cube());
        scene.graph.node_mut(cube).unwrap().set_scale(Vector3::new(0.0, 0.0, 0.0));
        scene.update_transforms();

        let ray = Ray::new(Vector3::new(0.0, 0.0, 5.0), Vector3::new(0.0, 0.0, -1.0));
        assert!(RayPicker::default().cast(&scene, &[root], &ray).is_none());
    }

    #[test]
    fn test_empty_scene_has_no_hit() {
        let scene = Scene::new("empty");
        let ray = Ray::new(Vector3::new(0.0, 0.0, 5.0), Vector3::new(0.0, 0.0, -1.0));
        assert!(RayPicker::default().cast(&scene, &[scene.root()], &ray).is_none());
    }
}
