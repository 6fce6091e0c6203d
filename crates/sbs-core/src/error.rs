//! Error types for SBS Studio.

use thiserror::Error;

/// Main error type for stereo conversion operations.
#[derive(Error, Debug)]
pub enum StereoError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid options: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("Cancelled: {0}")]
    Cancelled(String),

    #[error("Failed to extract frame {index}: {message}")]
    Extraction { index: u64, message: String },

    #[error("Conversion error: {0}")]
    Conversion(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Config error: {0}")]
    Config(String),
}

impl StereoError {
    /// Whether this error records a cooperative cancellation rather than a failure.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }
}

/// Result type alias for stereo conversion operations.
pub type Result<T> = std::result::Result<T, StereoError>;
