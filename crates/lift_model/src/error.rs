//! Error types for the model crate.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors that can occur while reading or writing model data.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),

    #[error("Invalid format in file {path}: {message}")]
    InvalidFormat { path: PathBuf, message: String },

    #[error("No snapshot found in audit directory: {0}")]
    NoSnapshot(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
