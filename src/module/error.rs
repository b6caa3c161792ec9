//! Error type shared by every module.

use thiserror::Error;

/// Everything that can stop the capture loop.
#[derive(Debug, Error)]
pub enum TimelapseError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("failed to parse config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("failed to write config: {0}")]
    ConfigWrite(#[from] toml::ser::Error),

    #[error("failed to parse capture metadata: {0}")]
    Metadata(#[from] serde_json::Error),

    #[error("camera error: {0}")]
    Camera(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("image has no pixels: {0}")]
    EmptyImage(String),
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, TimelapseError>;
