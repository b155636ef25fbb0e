//! Kelpie 3D Editor Core
//!
//! Scene graph, object picking and transform gizmos for interactive 3D
//! editors built on wgpu and winit. Hosts own the window and the renderer;
//! the [`Editor`] turns their input into selection and transform edits.

pub mod config;
pub mod editor;
pub mod error;
pub mod gfx;
pub mod input;
pub mod prelude;
pub mod wgpu_utils;

// Re-export main types for convenience
pub use editor::Editor;
pub use error::{EditorError, Result};
