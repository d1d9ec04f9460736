// ABOUTME: Orchestrator errors: only tenant resolution and query embedding are fatal; backend failures are absorbed into synthesis

use thiserror::Error;

pub type Result<T> = std::result::Result<T, OrchestratorError>;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("tenant unavailable: {0}")]
    TenantUnavailable(String),

    #[error("query embedding failed: {0}")]
    Embedding(String),
}

impl From<OrchestratorError> for meridian_core::error::MeridianError {
    fn from(err: OrchestratorError) -> Self {
        match err {
            OrchestratorError::TenantUnavailable(id) => Self::TenantUnavailable(id),
            OrchestratorError::Embedding(msg) => Self::BackendUnavailable {
                backend: "embedder".to_string(),
                message: msg,
            },
        }
    }
}
