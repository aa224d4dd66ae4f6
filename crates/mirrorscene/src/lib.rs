//! mirrorscene: a real-time planar reflection demo.
//!
//! A shiny sphere lit by orbiting point lights floats above a spinning mirror
//! under a cubemap sky. Every frame renders four passes:
//!
//! 1. a shadow map of the sphere from a fixed light
//! 2. the scene as seen through the mirror, into a low-resolution target
//! 3. skybox and sphere from the orbiting camera
//! 4. the mirror quad, sampling the reflection with a small distortion
//!
//! # Quick Start
//!
//! ```no_run
//! use mirrorscene::*;
//!
//! fn main() -> Result<()> {
//!     let config = load_config(None)?;
//!     show(config)
//! }
//! ```
//!
//! Frames can also be rendered without a window:
//!
//! ```no_run
//! use mirrorscene::*;
//!
//! let config = SceneConfig::default();
//! render_to_file(&config, 1500.0, "frame.png").unwrap();
//! ```

mod app;
mod headless;
mod init;

use thiserror::Error;

// Re-export core types
pub use mirrorscene_core::{
    FrameContext, FrameRenderer, GpuFacade, Mat4, RecordingFacade, SceneConfig, SceneError,
    TargetSizes, Vec3,
};

// Re-export render types
pub use mirrorscene_render::{
    DirectoryImageLoader, ImageLoader, ProceduralImageLoader, RenderEngine, RenderError,
};

pub use headless::{render_frames, render_to_file, render_to_image};
pub use init::{image_loader, load_config, show};

/// Errors surfaced by the demo's entry points.
#[derive(Error, Debug)]
pub enum MirrorError {
    /// Invalid or unreadable scene configuration.
    #[error(transparent)]
    Scene(#[from] SceneError),

    /// GPU setup, asset loading or frame capture failed.
    #[error(transparent)]
    Render(#[from] RenderError),

    /// The window could not be created.
    #[error("failed to create window: {0}")]
    Window(#[from] winit::error::OsError),

    /// The event loop could not be created or exited abnormally.
    #[error("event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
}

/// A specialized Result type for mirrorscene operations.
pub type Result<T> = std::result::Result<T, MirrorError>;
