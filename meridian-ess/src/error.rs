// ABOUTME: Error classification table: AuthFailed/Validation/RateLimited/Transient/StreamTruncated

use thiserror::Error;

pub type Result<T> = std::result::Result<T, EssError>;

#[derive(Debug, Error)]
pub enum EssError {
    #[error("ess authentication failed: {0}")]
    AuthFailed(String),

    #[error("ess rejected request: {0}")]
    Validation(String),

    #[error("ess rate limited: retry after {retry_after_secs:?}s")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("ess transient failure: {0}")]
    Transient(String),

    #[error("ess response could not be parsed: {0}")]
    StreamTruncated(String),

    #[error("storage error: {0}")]
    Storage(#[from] meridian_storage::StorageError),
}

impl EssError {
    #[must_use]
    pub fn classify(status: reqwest::StatusCode, retry_after_secs: Option<u64>, body: &str) -> Self {
        match status.as_u16() {
            401 | 403 => Self::AuthFailed(body.to_string()),
            400 => Self::Validation(body.to_string()),
            429 => Self::RateLimited { retry_after_secs },
            408 => Self::Transient(body.to_string()),
            s if (500..600).contains(&s) => Self::Transient(body.to_string()),
            _ => Self::Transient(body.to_string()),
        }
    }

    #[must_use]
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::AuthFailed(_) | Self::Validation(_))
    }
}

impl From<reqwest::Error> for EssError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() {
            Self::Transient(err.to_string())
        } else {
            Self::StreamTruncated(err.to_string())
        }
    }
}

impl From<EssError> for meridian_core::error::MeridianError {
    fn from(err: EssError) -> Self {
        match err {
            EssError::AuthFailed(msg) => Self::Unauthorized(msg),
            EssError::Validation(msg) => Self::ValidationFailed(msg),
            EssError::RateLimited { retry_after_secs } => Self::RateLimited {
                message: "ess rate limited".to_string(),
                retry_after_secs,
            },
            EssError::Transient(msg) => Self::BackendTransient {
                backend: "ess".to_string(),
                message: msg,
            },
            EssError::StreamTruncated(msg) => Self::BackendTransient {
                backend: "ess".to_string(),
                message: msg,
            },
            EssError::Storage(e) => Self::Internal(e.to_string()),
        }
    }
}
