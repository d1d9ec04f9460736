// ABOUTME: Ingestion coordinator errors; embedding/dimension failures are fatal, backend dual-write failures are reported, not raised

use thiserror::Error;

pub type Result<T> = std::result::Result<T, IngestionError>;

#[derive(Debug, Error)]
pub enum IngestionError {
    #[error("document produced no chunks")]
    EmptyDocument,

    #[error("embedding dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("embedding provider failed: {0}")]
    Embedding(String),

    #[error("quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("backend operation failed: {0}")]
    Backend(String),
}

impl From<meridian_providers::ProviderError> for IngestionError {
    fn from(err: meridian_providers::ProviderError) -> Self {
        Self::Embedding(err.to_string())
    }
}

impl From<meridian_rag::RagError> for IngestionError {
    fn from(err: meridian_rag::RagError) -> Self {
        Self::Backend(err.to_string())
    }
}

impl From<meridian_core::error::MeridianError> for IngestionError {
    fn from(err: meridian_core::error::MeridianError) -> Self {
        Self::Backend(err.to_string())
    }
}

impl From<IngestionError> for meridian_core::error::MeridianError {
    fn from(err: IngestionError) -> Self {
        match err {
            IngestionError::QuotaExceeded(msg) => Self::QuotaExceeded(msg),
            other => Self::ValidationFailed(other.to_string()),
        }
    }
}
