// ABOUTME: Errors surfaced by the embedding/LLM egress adapters

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProviderError>;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("provider returned an unexpected response shape: {0}")]
    UnexpectedResponse(String),

    #[error("provider returned dimension {got}, expected {expected}")]
    DimensionMismatch { expected: usize, got: usize },
}

impl From<ProviderError> for meridian_core::error::MeridianError {
    fn from(err: ProviderError) -> Self {
        let message = err.to_string();
        match err {
            ProviderError::Transport(e) if e.is_timeout() || e.is_connect() => Self::BackendTransient {
                backend: "provider".to_string(),
                message,
            },
            _ => Self::BackendUnavailable {
                backend: "provider".to_string(),
                message,
            },
        }
    }
}
