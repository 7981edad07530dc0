//! Error types for artifact emission.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias for emission operations.
pub type IacResult<T> = Result<T, IacError>;

/// Errors that can occur while rendering or writing artifacts.
#[derive(Error, Debug)]
pub enum IacError {
    /// A template placeholder had no value. Recoverable per artifact.
    #[error("Missing substitution for placeholder: {0}")]
    MissingSubstitution(String),

    #[error("Failed to write artifact {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
