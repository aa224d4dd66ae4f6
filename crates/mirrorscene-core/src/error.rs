//! Error types for mirrorscene.

use thiserror::Error;

/// Errors raised while loading or validating a scene description.
///
/// The per-frame path never fails; only setup does.
#[derive(Error, Debug)]
pub enum SceneError {
    /// A configuration value is out of range.
    #[error("invalid scene config: {0}")]
    InvalidConfig(String),

    /// I/O error while reading a config file.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// A specialized Result type for scene setup.
pub type Result<T> = std::result::Result<T, SceneError>;
