use cgmath::{InnerSpace, Matrix4, Vector3};

/// Read-only camera interface.
///
/// `right`, `up` and `front` must form an orthonormal basis in world space.
/// The gizmo projects drag axes onto `right`/`up` and uses `front` to decide
/// which way a rotation ring is being viewed from.
pub trait CameraView {
    fn view_matrix(&self) -> Matrix4<f32>;

    /// Eye position in world space.
    fn position(&self) -> Vector3<f32>;

    /// Unit viewing direction.
    fn front(&self) -> Vector3<f32>;

    fn right(&self) -> Vector3<f32> {
        self.front().cross(Vector3::unit_y()).normalize()
    }

    fn up(&self) -> Vector3<f32> {
        self.right().cross(self.front()).normalize()
    }
}

pub fn convert_matrix4_to_array(matrix4: Matrix4<f32>) -> [[f32; 4]; 4] {
    matrix4.into()
}
