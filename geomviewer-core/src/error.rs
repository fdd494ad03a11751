//! Error types for geomviewer

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for geomviewer operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to decode {format} file {path:?}: {message}")]
    Decode {
        path: PathBuf,
        format: &'static str,
        message: String,
    },

    #[error("Precondition violation: {0}")]
    PreconditionViolation(String),

    #[error("GPU error: {0}")]
    Gpu(String),

    #[error("Window error: {0}")]
    Window(String),
}

/// Result type alias for geomviewer operations
pub type Result<T> = std::result::Result<T, Error>;
