//! # Transform Gizmo
//!
//! Interactive translate / rotate / scale handles for the selected node.
//!
//! ## Key Components
//!
//! - [`TransformGizmo`] - Drag state machine and the math for each mode
//! - [`AxisRig`] - The handle subtree of one mode and its part to axis table
//! - [`TransformMode`] / [`GizmoAxis`] - What is being manipulated, and along what
//!
//! ## Usage
//!
//! ```no_run
//! use kelpie::config::GizmoConfig;
//! use kelpie::gfx::gizmos::{TransformGizmo, TransformMode};
//! use kelpie::gfx::scene::Scene;
//!
//! let mut scene = Scene::new("main");
//! let mut gizmo = TransformGizmo::new(&mut scene, GizmoConfig::default());
//! gizmo.set_mode(&mut scene, TransformMode::Rotate).unwrap();
//! ```

pub mod rig;
pub mod transform_gizmo;

pub use rig::{AxisRig, RigPart};
pub use transform_gizmo::{DragSession, GizmoState, TransformGizmo, TransformSnapshot};

use cgmath::Vector3;

use crate::gfx::geometry::Axis;

/// Gizmo operation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TransformMode {
    /// Move along an axis or in the camera plane.
    #[default]
    Translate,
    /// Rotate around an axis.
    Rotate,
    /// Scale along an axis or uniformly.
    Scale,
}

impl TransformMode {
    pub const ALL: [TransformMode; 3] = [TransformMode::Translate, TransformMode::Rotate, TransformMode::Scale];

    pub fn name(self) -> &'static str {
        match self {
            TransformMode::Translate => "translate",
            TransformMode::Rotate => "rotate",
            TransformMode::Scale => "scale",
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            TransformMode::Translate => 0,
            TransformMode::Rotate => 1,
            TransformMode::Scale => 2,
        }
    }
}

/// Axis a handle constrains a drag to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GizmoAxis {
    X,
    Y,
    Z,
    /// Center handle: camera-plane move or uniform scale.
    Composite,
}

impl GizmoAxis {
    pub fn direction(self) -> Option<Vector3<f32>> {
        match self {
            GizmoAxis::X => Some(Vector3::unit_x()),
            GizmoAxis::Y => Some(Vector3::unit_y()),
            GizmoAxis::Z => Some(Vector3::unit_z()),
            GizmoAxis::Composite => None,
        }
    }

    /// Display color hosts use when shading the handle.
    pub fn color(self) -> [f32; 4] {
        match self {
            GizmoAxis::X => [1.0, 0.2, 0.2, 1.0],
            GizmoAxis::Y => [0.2, 1.0, 0.2, 1.0],
            GizmoAxis::Z => [0.2, 0.5, 1.0, 1.0],
            GizmoAxis::Composite => [1.0, 1.0, 1.0, 1.0],
        }
    }
}

impl From<Axis> for GizmoAxis {
    fn from(axis: Axis) -> Self {
        match axis {
            Axis::X => GizmoAxis::X,
            Axis::Y => GizmoAxis::Y,
            Axis::Z => GizmoAxis::Z,
        }
    }
}
