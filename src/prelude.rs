//! # Kelpie Prelude
//!
//! Commonly used types for hosts embedding the editor.
//!
//! ```no_run
//! use kelpie::prelude::*;
//!
//! let mut scene = Scene::new("main");
//! let editor = Editor::new(&mut scene, EditorConfig::default());
//! assert_eq!(editor.mode(), TransformMode::Translate);
//! ```

// Re-export core editor types
pub use crate::config::{EditorConfig, GizmoConfig, PickMode, PickingConfig};
pub use crate::editor::Editor;
pub use crate::error::{EditorError, Result};
pub use crate::input::InputState;

// Re-export graphics and scene types
pub use crate::gfx::camera::{CameraView, OrbitCamera};
pub use crate::gfx::geometry::{generate_box, generate_cube, GeometryData};
pub use crate::gfx::gizmos::{GizmoAxis, TransformGizmo, TransformMode};
pub use crate::gfx::gpu::GpuContext;
pub use crate::gfx::picking::{ColorPicker, PickOutcome, PickRole, RayPicker};
pub use crate::gfx::scene::{NodeId, NodeKind, Scene, SceneEvent, SceneGraph};
pub use crate::gfx::viewport::Viewport;

// Re-export common external dependencies
pub use cgmath::{InnerSpace, Quaternion, Vector3, Zero};
