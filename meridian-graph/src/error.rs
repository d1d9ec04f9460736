// ABOUTME: Graph adapter error enum covering backend failures, not-found lookups, and invalid queries

use thiserror::Error;

pub type Result<T> = std::result::Result<T, GraphError>;

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("entity not found: {0}")]
    EntityNotFound(String),

    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("isolation violation in graph adapter: {0}")]
    IsolationViolation(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<GraphError> for meridian_core::error::MeridianError {
    fn from(err: GraphError) -> Self {
        match err {
            GraphError::EntityNotFound(msg) => Self::NotFound(msg),
            GraphError::InvalidQuery(msg) => Self::ValidationFailed(msg),
            GraphError::IsolationViolation(msg) => Self::IsolationViolation {
                component: "meridian-graph".to_string(),
                message: msg,
            },
            GraphError::Serialization(e) => Self::Internal(e.to_string()),
        }
    }
}
