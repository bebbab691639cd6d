//! # Error Types
//!
//! Custom error types for Wirelink using `thiserror`.

use thiserror::Error;

use crate::frame::protocol::DecodeError;

/// Main error type for Wirelink
#[derive(Debug, Error)]
pub enum WireError {
    /// Frame decoding errors
    #[error("Frame error: {0}")]
    Decode(#[from] DecodeError),

    /// Bytes ran out before the end of the frame
    #[error("Incomplete frame: {0} bytes consumed")]
    IncompleteFrame(usize),

    /// Payload does not fit in one frame
    #[error("Payload of {len} bytes exceeds maximum {max}")]
    PayloadTooLarge { len: usize, max: usize },

    /// Transport errors
    #[error("Transport error: {0}")]
    Transport(String),

    /// Diagnostic sink errors
    #[error("Diagnostics error: {0}")]
    Diagnostics(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Wirelink
pub type Result<T> = std::result::Result<T, WireError>;
