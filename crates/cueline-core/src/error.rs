//! Error types for Cueline.

use thiserror::Error;

/// Main error type for document-level Cueline operations.
#[derive(Error, Debug)]
pub enum CuelineError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for Cueline operations.
pub type Result<T> = std::result::Result<T, CuelineError>;
