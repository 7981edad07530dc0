//! Error types for the cloud collaborator layer.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for cloud operations.
pub type CloudResult<T> = Result<T, CloudError>;

/// Errors raised by inventory providers and image services.
#[derive(Error, Debug)]
pub enum CloudError {
    #[error("{resource_type} not found: {id}")]
    NotFound { resource_type: String, id: String },

    #[error("Provider request failed: {0}")]
    Provider(String),

    #[error("Image {image_id} entered state '{state}'")]
    ImageFailed { image_id: String, state: String },

    #[error("Image {image_id} not available after {attempts} attempts")]
    ImageTimeout { image_id: String, attempts: u32 },

    #[error("Invalid image map {path}: {message}")]
    InvalidImageMap { path: PathBuf, message: String },

    #[error("Model error: {0}")]
    Model(#[from] lift_model::ModelError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CloudError {
    pub fn not_found(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource_type: resource_type.into(),
            id: id.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}
