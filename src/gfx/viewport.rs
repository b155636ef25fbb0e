//! Viewport dimensions and perspective projection.

use cgmath::{perspective, Deg, Matrix4};

use super::camera::orbit_camera::OPENGL_TO_WGPU_MATRIX;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub near: f32,
    pub far: f32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    pub fn aspect(&self) -> f32 {
        self.width.max(1) as f32 / self.height.max(1) as f32
    }

    /// OpenGL-convention projection. Ray unprojection works in this clip space.
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        perspective(Deg(self.fov), self.aspect(), self.near, self.far)
    }

    /// Projection for wgpu pipelines (depth in 0..1).
    pub fn gpu_projection_matrix(&self) -> Matrix4<f32> {
        OPENGL_TO_WGPU_MATRIX * self.projection_matrix()
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
    }

    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= 0.0 && y >= 0.0 && x < self.width as f32 && y < self.height as f32
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            fov: 45.0,
            near: 0.1,
            far: 100.0,
        }
    }
}
