//! Camera types consumed by picking and the transform gizmo.
//!
//! The editor never owns a camera. It reads the view matrix and the
//! camera-space basis through [`CameraView`] each frame.

pub mod camera_utils;
pub mod orbit_camera;

pub use camera_utils::{convert_matrix4_to_array, CameraView};
pub use orbit_camera::{OrbitCamera, OrbitCameraBounds};
