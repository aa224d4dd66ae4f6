//! Rendering backend for mirrorscene.
//!
//! This crate provides the wgpu implementation of the core's GPU seam:
//! - [`RenderEngine`]: device, surface, targets and per-frame submission
//! - [`WgpuFacade`]: render passes, pipeline variants and dynamic uniforms
//!   behind [`mirrorscene_core::GpuFacade`]
//! - WGSL shaders with `{{NUM_LIGHTS}}` templating
//! - image loading for the cubemap and distortion map

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Builder patterns return Self which doesn't need must_use
#![allow(clippy::must_use_candidate)]
// Pixel sizes and byte offsets fit comfortably in the target types
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_sign_loss)]

pub mod buffer;
pub mod engine;
pub mod error;
pub mod facade;
pub mod loader;
pub mod pipelines;
pub mod screenshot;
pub mod shader;
pub mod targets;
pub mod textures;
pub mod uniform_arena;

pub use buffer::{GpuMesh, SceneMeshes};
pub use engine::RenderEngine;
pub use error::{RenderError, RenderResult};
pub use facade::{FacadeState, WgpuFacade};
pub use loader::{
    DirectoryImageLoader, ImageLoader, ProceduralImageLoader, SceneImages, CUBEMAP_FACES,
    DISTORTION_MAP,
};
pub use pipelines::{PipelineCache, PipelineKey};
pub use screenshot::{save_image, ScreenshotError};
pub use shader::ShaderBuilder;
pub use targets::{RenderTargets, TargetFormats};
pub use textures::SceneTextures;
pub use uniform_arena::{ProgramArenas, StagingBlocks};
