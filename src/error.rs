//! Error type shared by every fallible stage of the demo.
//!
//! Nothing here is retried: an error aborts the run and is reported once at
//! the top level.

use thiserror::Error;

/// Demo-level errors
#[derive(Error, Debug)]
pub enum DemoError {
    /// The window could not be turned into a wgpu surface
    #[error("Failed to create surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),

    /// No adapter can present to the window
    #[error("Failed to find suitable GPU adapter")]
    NoAdapter,

    /// Device creation failed
    #[error("Failed to request device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),

    /// A GPU object could not be created (validation, out of memory, lost device)
    #[error("GPU error while creating {what}: {message}")]
    Gpu { what: &'static str, message: String },

    /// The back buffer could not be acquired
    #[error("Surface error: {0}")]
    Surface(#[from] wgpu::SurfaceError),

    /// Waiting on the completion counter returned without reaching the value
    #[error("GPU did not reach fence value {target} (completed {completed})")]
    FenceWait { target: u64, completed: u64 },

    /// A render item names a submesh its geometry does not have
    #[error("Mesh '{mesh}' has no submesh named '{submesh}'")]
    MissingSubmesh { mesh: String, submesh: String },

    /// Window creation failed
    #[error("Window creation failed: {0}")]
    Window(#[from] winit::error::OsError),

    /// The event loop could not be created or run
    #[error("Event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
}

pub type Result<T> = std::result::Result<T, DemoError>;
