//! Error types for the editor core.
//!
//! Picking misses and unknown ids are ordinary outcomes, not errors. The
//! variants here cover GPU setup, readback, configuration, and operations the
//! editor refuses to perform in its current state.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EditorError {
    #[error("no suitable GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),

    #[error("failed to create GPU device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("picking target must be non-empty, got {width}x{height}")]
    InvalidTargetSize { width: u32, height: u32 },

    #[error("pick readback failed: {0}")]
    Readback(#[from] wgpu::BufferAsyncError),

    #[error("device poll failed: {0}")]
    Poll(#[from] wgpu::PollError),

    #[error("readback channel closed before the buffer was mapped")]
    ReadbackCancelled,

    #[error("color picking requires a GPU context")]
    GpuPickingUnavailable,

    #[error("cannot change gizmo mode while a drag is in progress")]
    DragInProgress,

    #[error("invalid editor configuration: {0}")]
    Config(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, EditorError>;
