//! # Scene Management Module
//!
//! Hierarchical transform nodes, the meshes they reference, and the change
//! events they emit.
//!
//! ## Key Components
//!
//! - [`Scene`] - A named graph with a designated root and its mesh library
//! - [`SceneGraph`] - Node arena, hierarchy edits, transform update, listeners
//! - [`SceneNode`] - Position, rotation, scale and cached local/world matrices
//! - [`MeshLibrary`] - Owner of mesh data and GPU buffers
//! - [`SceneEvent`] - Node and selection change notifications

pub mod events;
pub mod graph;
pub mod mesh;
pub mod node;
pub mod scene;
pub mod vertex;

pub use events::{ListenerId, NodeChange, SceneEvent};
pub use graph::{NodeMut, SceneGraph};
pub use mesh::{DrawMesh, Mesh, MeshId, MeshLibrary};
pub use node::{NodeId, NodeKind, SceneNode};
pub use scene::Scene;
pub use vertex::Vertex3D;
