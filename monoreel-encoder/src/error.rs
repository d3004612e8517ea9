//! Encoder error types

use std::path::PathBuf;

use monoreel_format::FormatError;
use thiserror::Error;

/// Invalid encoder settings, detected before any frame is read
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Height must be a whole number of 8-row pages
    #[error("height {0} is not a multiple of 8")]
    HeightNotPageAligned(u32),

    #[error("width and height must be non-zero")]
    ZeroDimension,

    /// Dimensions are stored as u16 in the header
    #[error("dimension {0} does not fit the stream header")]
    DimensionTooLarge(u32),

    #[error("{name} must be at least 0.001, got {value}")]
    InvalidFps { name: &'static str, value: f64 },

    /// Failed to read preset file
    #[error("failed to read preset: {0}")]
    Read(#[from] std::io::Error),

    /// Failed to parse preset file
    #[error("failed to parse preset: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Errors while encoding a stream
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("no frames found in {0}")]
    NoFrames(PathBuf),

    #[error("frame is {actual} bytes, stream expects {expected}")]
    FrameSizeMismatch { expected: usize, actual: usize },

    #[error("frame count exceeds the header range")]
    TooManyFrames,

    #[error("failed to pack frame: {0}")]
    Pack(#[from] FormatError),

    #[error("failed to write preview {path}: {source}")]
    Preview {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
