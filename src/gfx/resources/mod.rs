//! GPU resource helpers.

pub mod texture_resource;

pub use texture_resource::TextureResource;
