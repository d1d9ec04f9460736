// ABOUTME: Vector adapter error enum

use thiserror::Error;

pub type Result<T> = std::result::Result<T, RagError>;

#[derive(Debug, Error)]
pub enum RagError {
    #[error("mixed-tenant batch: expected {expected}, found {found}")]
    MixedTenantBatch { expected: String, found: String },

    #[error("embedding dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("isolation violation in vector adapter: {0}")]
    IsolationViolation(String),

    #[error("document not found: {0}")]
    DocumentNotFound(String),
}

impl From<RagError> for meridian_core::error::MeridianError {
    fn from(err: RagError) -> Self {
        let message = err.to_string();
        match err {
            RagError::MixedTenantBatch { .. } | RagError::DimensionMismatch { .. } => {
                Self::ValidationFailed(message)
            }
            RagError::IsolationViolation(msg) => Self::IsolationViolation {
                component: "meridian-rag".to_string(),
                message: msg,
            },
            RagError::DocumentNotFound(msg) => Self::NotFound(msg),
        }
    }
}
