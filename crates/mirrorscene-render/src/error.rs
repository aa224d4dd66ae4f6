//! Rendering error types.

use thiserror::Error;

/// Errors that can occur while setting up or driving the GPU.
#[derive(Error, Debug)]
pub enum RenderError {
    /// Failed to create wgpu adapter.
    #[error("failed to create graphics adapter")]
    AdapterCreationFailed,

    /// Failed to create wgpu device.
    #[error("failed to create graphics device: {0}")]
    DeviceCreationFailed(#[from] wgpu::RequestDeviceError),

    /// Failed to create surface.
    #[error("failed to create surface: {0}")]
    SurfaceCreationFailed(#[from] wgpu::CreateSurfaceError),

    /// The surface offers no usable format.
    #[error("surface configuration failed")]
    SurfaceConfigurationFailed,

    /// Shader source could not be assembled.
    #[error("shader compilation failed: {0}")]
    ShaderCompilationFailed(String),

    /// Texture creation failed.
    #[error("texture creation failed: {0}")]
    TextureCreationFailed(String),

    /// An image could not be read or decoded.
    #[error("failed to load image '{name}': {reason}")]
    ImageLoadFailed { name: String, reason: String },

    /// The device ran out of memory acquiring a frame.
    #[error("out of memory")]
    OutOfMemory,

    /// The next surface texture could not be acquired.
    #[error("failed to acquire surface texture: {0}")]
    SurfaceAcquisitionFailed(wgpu::SurfaceError),

    /// Reading back or saving a rendered frame failed.
    #[error("frame capture failed: {0}")]
    Capture(#[from] crate::screenshot::ScreenshotError),
}

impl From<wgpu::SurfaceError> for RenderError {
    fn from(err: wgpu::SurfaceError) -> Self {
        match err {
            wgpu::SurfaceError::OutOfMemory => RenderError::OutOfMemory,
            other => RenderError::SurfaceAcquisitionFailed(other),
        }
    }
}

/// A specialized Result type for rendering operations.
pub type RenderResult<T> = std::result::Result<T, RenderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_errors_keep_their_cause() {
        assert!(matches!(
            RenderError::from(wgpu::SurfaceError::OutOfMemory),
            RenderError::OutOfMemory
        ));
        assert!(matches!(
            RenderError::from(wgpu::SurfaceError::Timeout),
            RenderError::SurfaceAcquisitionFailed(wgpu::SurfaceError::Timeout)
        ));
        assert!(matches!(
            RenderError::from(wgpu::SurfaceError::Other),
            RenderError::SurfaceAcquisitionFailed(wgpu::SurfaceError::Other)
        ));
    }
}
