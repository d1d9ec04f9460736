use thiserror::Error;

pub type Result<T> = std::result::Result<T, SecurityError>;

#[derive(Debug, Error)]
pub enum SecurityError {
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("forbidden: missing permission {0}")]
    Forbidden(String),

    #[error("rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("token error: {0}")]
    Token(#[from] jsonwebtoken::errors::Error),

    #[error("storage error: {0}")]
    Storage(#[from] meridian_storage::StorageError),
}

impl From<SecurityError> for meridian_core::error::MeridianError {
    fn from(err: SecurityError) -> Self {
        match err {
            SecurityError::Unauthorized(msg) => Self::Unauthorized(msg),
            SecurityError::Forbidden(msg) => Self::Forbidden(msg),
            SecurityError::RateLimited { retry_after_secs } => Self::RateLimited {
                message: "too many failed attempts".to_string(),
                retry_after_secs: Some(retry_after_secs),
            },
            SecurityError::Token(e) => Self::Unauthorized(e.to_string()),
            SecurityError::Storage(e) => Self::Internal(e.to_string()),
        }
    }
}
