//! Error types for the detect3d-eval library.

use thiserror::Error;

/// Result type for detect3d-eval operations.
pub type Result<T> = std::result::Result<T, Detect3dError>;

/// Error types that can occur while decoding, suppressing or evaluating boxes.
#[derive(Error, Debug)]
pub enum Detect3dError {
    /// Tensor layout does not match the expected anchor/field layout.
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    /// Score, suppression or IoU threshold outside its valid range.
    #[error("Invalid threshold: {0}")]
    InvalidThreshold(String),

    /// Box with non-finite geometry.
    #[error("Invalid box: {0}")]
    InvalidBox(String),

    /// Error during JSON parsing or serialization.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Error during I/O operations.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
