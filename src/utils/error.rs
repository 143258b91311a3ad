//! Error types for the upload optimizer.
//!
//! Provides a hierarchy of error types using `thiserror` for ergonomic error handling.

use std::io;
use serde::Serialize;
use thiserror::Error;

/// Failures reported by a [`Codec`](crate::processing::Codec) implementation.
///
/// The optimizer maps these onto [`OptimizerError`] depending on which
/// pipeline stage produced them.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
pub enum CodecError {
    /// The bytes could not be decoded into pixels
    #[error("Decode failed: {0}")]
    Decode(String),
    /// Resampling onto the output surface failed
    #[error("Draw failed: {0}")]
    Draw(String),
    /// The encoder rejected the surface
    #[error("Encode failed: {0}")]
    Encode(String),
    /// The encoder completed but produced no bytes
    #[error("Encoder returned an empty result")]
    EmptyOutput,
    /// The host environment failed underneath the codec (task panic, cancelled join)
    #[error("Host failure: {0}")]
    Host(String),
}

/// Main error type for the optimizer.
///
/// Every failure of [`ImageOptimizer::optimize`](crate::ImageOptimizer::optimize)
/// is one of these variants; the caller decides how to present it.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
pub enum OptimizerError {
    /// Input is larger than the configured ceiling
    #[error("File size must be less than {max_mb}MB ({size_bytes} bytes given)")]
    FileTooLarge {
        size_bytes: u64,
        max_bytes: u64,
        max_mb: f64,
    },

    /// Declared MIME type is outside the image category
    #[error("File must be an image (got '{mime_type}')")]
    NotAnImage { mime_type: String },

    /// Decoding failed or the host failed while decoding
    #[error("Failed to load image: {0}")]
    ImageDecode(String),

    /// Encoding produced nothing or failed
    #[error("Failed to optimize image: {0}")]
    EncodeFailed(String),

    /// The decoded image reports a zero-sized side
    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidImageDimensions { width: u32, height: u32 },

    /// Configuration out of range or unparsable
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Convenience result type for optimizer operations.
pub type OptimizerResult<T> = Result<T, OptimizerError>;

// Helper methods for error creation
impl OptimizerError {
    pub fn file_too_large(size_bytes: u64, max_bytes: u64, max_mb: f64) -> Self {
        Self::FileTooLarge { size_bytes, max_bytes, max_mb }
    }

    pub fn not_an_image(mime_type: impl Into<String>) -> Self {
        Self::NotAnImage { mime_type: mime_type.into() }
    }

    pub fn decode<T: Into<String>>(msg: T) -> Self {
        Self::ImageDecode(msg.into())
    }

    pub fn encode<T: Into<String>>(msg: T) -> Self {
        Self::EncodeFailed(msg.into())
    }

    pub fn config<T: Into<String>>(msg: T) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Maps a codec failure raised while decoding.
    ///
    /// Anything the host reports during decode counts as a decode error.
    pub fn from_decode_stage(err: CodecError) -> Self {
        match err {
            CodecError::Decode(msg) | CodecError::Host(msg) => Self::ImageDecode(msg),
            other => Self::ImageDecode(other.to_string()),
        }
    }

    /// Maps a codec failure raised while drawing or encoding.
    pub fn from_encode_stage(err: CodecError) -> Self {
        match err {
            CodecError::EmptyOutput => Self::EncodeFailed("encoder returned no data".to_string()),
            CodecError::Encode(msg) | CodecError::Draw(msg) | CodecError::Host(msg) => {
                Self::EncodeFailed(msg)
            }
            CodecError::Decode(msg) => Self::EncodeFailed(msg),
        }
    }

    /// Short stable identifier, handy for presentation layers and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::FileTooLarge { .. } => "FileTooLarge",
            Self::NotAnImage { .. } => "NotAnImage",
            Self::ImageDecode(_) => "ImageDecodeError",
            Self::EncodeFailed(_) => "EncodeFailed",
            Self::InvalidImageDimensions { .. } => "InvalidImageDimensions",
            Self::InvalidConfig(_) => "InvalidConfig",
        }
    }
}

impl From<serde_json::Error> for OptimizerError {
    fn from(err: serde_json::Error) -> Self {
        Self::InvalidConfig(err.to_string())
    }
}

/// Errors raised by the PIN persistence layer.
#[derive(Error, Debug, Serialize)]
pub enum PinError {
    /// Reading or writing the backing store failed
    #[error("Store IO error: {0}")]
    IO(String),
    /// The backing store holds data that is not a JSON object of strings
    #[error("Store is corrupt: {0}")]
    Corrupt(String),
}

/// Convenience result type for PIN operations.
pub type PinResult<T> = Result<T, PinError>;

impl From<io::Error> for PinError {
    fn from(err: io::Error) -> Self {
        Self::IO(err.to_string())
    }
}

impl From<serde_json::Error> for PinError {
    fn from(err: serde_json::Error) -> Self {
        Self::Corrupt(err.to_string())
    }
}
