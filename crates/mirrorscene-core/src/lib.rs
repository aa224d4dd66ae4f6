//! Core of mirrorscene.
//!
//! This crate holds everything about the demo that does not touch a GPU:
//! - [`FrameContext`]: per-frame camera, light and model state
//! - the planar [`reflection`] builder
//! - [`FrameRenderer`], which sequences the shadow, reflection, main and
//!   mirror passes against the [`GpuFacade`] trait
//! - [`RecordingFacade`], a GPU-less facade for tests

// Documentation lints - internal functions don't need exhaustive panic/error docs
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
// Builder patterns return Self which doesn't need must_use
#![allow(clippy::must_use_candidate)]
// Pixel sizes and light counts are small
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

pub mod camera;
pub mod config;
pub mod draw_call;
pub mod error;
pub mod facade;
pub mod lights;
pub mod mesh;
pub mod orchestrator;
pub mod recording;
pub mod reflection;
pub mod scene;
pub mod uniforms;

pub use camera::OrbitCamera;
pub use config::{
    CameraConfig, LightsConfig, MirrorConfig, ObjectConfig, PointLightConfig, SceneConfig,
    ShadowConfig,
};
pub use draw_call::DrawCall;
pub use error::{Result, SceneError};
pub use facade::{Capability, CullFace, GpuFacade, Program, RenderTarget, TargetSizes, Viewport};
pub use lights::{LightRig, PointLight};
pub use mesh::{MeshData, Vertex};
pub use orchestrator::FrameRenderer;
pub use recording::{Command, DrawRecord, GpuState, RecordingFacade};
pub use reflection::{normal_matrix, reflection_matrix, surface_reflection_matrix};
pub use scene::{FrameContext, FrameMatrices};
pub use uniforms::{MirrorUniforms, ObjectUniforms, ShadowUniforms, SkyboxUniforms};

// Re-export glam types for convenience
pub use glam::{Mat3, Mat4, Vec2, Vec3, Vec4};
