//! Error types for the watermark-manager crate.

use std::path::PathBuf;

/// Errors that can occur while adjusting or watermarking an image.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A source or watermark image could not be decoded.
    #[error("failed to decode {}: {source}", .path.display())]
    Decode {
        /// Path of the file that failed to decode.
        path: PathBuf,
        /// Underlying codec error.
        source: image::ImageError,
    },

    /// Writing an encoded result to disk failed.
    #[error("failed to encode {}: {source}", .path.display())]
    Encode {
        /// Path of the file that failed to encode.
        path: PathBuf,
        /// Underlying codec error.
        source: image::ImageError,
    },

    /// The fixed watermark font could not be loaded.
    #[error("failed to load watermark font: {0}")]
    FontLoad(String),

    /// An adjustment keyword outside the supported set was requested.
    #[error("unsupported adjustment: {0:?}")]
    UnsupportedAdjustment(String),

    /// A text watermark was requested with an empty string.
    #[error("watermark text must not be empty")]
    EmptyWatermarkText,

    /// The output format is not supported.
    #[error("unsupported image format: {0}")]
    UnsupportedFormat(String),

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized `Result` type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
