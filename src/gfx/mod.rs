//! # Graphics Module
//!
//! Everything the editor core knows about 3D: the scene graph, geometry,
//! cameras, picking and the transform gizmo.
//!
//! ## Architecture Overview
//!
//! - **Scene Management** ([`scene`]) - Node hierarchy, meshes and change events
//! - **Geometry** ([`geometry`]) - Procedural meshes for cubes and gizmo handles
//! - **Camera System** ([`camera`]) - Read-only camera interface and an orbit camera
//! - **Picking** ([`picking`]) - Ray-cast and GPU color-id selection
//! - **Gizmos** ([`gizmos`]) - Translate, rotate and scale handles with drag logic
//! - **GPU Resources** ([`gpu`], [`resources`]) - Device sharing and render targets
//!
//! Nothing here opens a window or presents frames. Hosts render the scene
//! themselves and hand the editor a [`camera::CameraView`] and a
//! [`viewport::Viewport`] each frame.

pub mod camera;
pub mod geometry;
pub mod gizmos;
pub mod gpu;
pub mod picking;
pub mod resources;
pub mod scene;
pub mod viewport;

// Re-export commonly used types
pub use camera::OrbitCamera;
pub use gpu::GpuContext;
pub use viewport::Viewport;
