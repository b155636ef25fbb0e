//! # Object Picking System
//!
//! Two interchangeable ways of turning a click into a node:
//!
//! - [`RayPicker`] - unprojects the cursor into a world-space ray and tests it
//!   against every triangle below the pickable roots. Needs no GPU. A miss
//!   leaves the selection alone.
//! - [`ColorPicker`] - draws every registered node in a unique flat color
//!   into an off-screen target and reads back the pixel under the cursor.
//!   Background clears the selection.
//!
//! Both report a [`PickOutcome`]. The [`PickRegistry`] owned by the color
//! picker also tells the editor whether a node is a scene object or a gizmo
//! handle.
//!
//! ## Usage
//!
//! ```no_run
//! use cgmath::Vector3;
//! use kelpie::gfx::{camera::OrbitCamera, picking::RayPicker, scene::Scene, viewport::Viewport};
//!
//! let mut scene = Scene::new("demo");
//! scene.update_transforms();
//! let camera = OrbitCamera::new(5.0, 0.0, 0.0, Vector3::new(0.0, 0.0, 0.0));
//! let hit = RayPicker::default().pick(&scene, &[scene.root()], &camera, &Viewport::default(), 640.0, 360.0);
//! assert!(hit.is_none());
//! ```

pub mod color_picker;
pub mod ray;
pub mod registry;

pub use color_picker::{ColorPicker, PickDraw, PickHit, PickOutcome, PickUniform};
pub use ray::{intersect_triangle, Ray, RayHit, RayPicker, TriangleHit};
pub use registry::{PickRegistry, PickRole};
