// ABOUTME: Shared error enum used across every meridian crate
// ABOUTME: Central error type shared by every crate; HTTP-layer status mapping lives in meridian-web

use thiserror::Error;

/// Convenience result alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, MeridianError>;

/// Stable error kinds shared by every component. Each variant corresponds
/// to a row in the error-handling design table: local recovery policy is
/// implemented by the caller (retry, drop-from-fan-out, fatal), not here.
#[derive(Debug, Error)]
pub enum MeridianError {
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("rate limited, retry after {retry_after_secs:?}s: {message}")]
    RateLimited {
        message: String,
        retry_after_secs: Option<u64>,
    },

    #[error("tenant unavailable: {0}")]
    TenantUnavailable(String),

    #[error("quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("validation failed: {0}")]
    ValidationFailed(String),

    #[error("backend transient error in {backend}: {message}")]
    BackendTransient { backend: String, message: String },

    #[error("backend unavailable: {backend}: {message}")]
    BackendUnavailable { backend: String, message: String },

    /// A result contained data whose `tenant_id` differs from the caller's.
    /// Always a bug. Never surfaced to a user; must be logged at error level
    /// and reported on a high-severity channel by the caller.
    #[error("isolation violation in {component}: {message}")]
    IsolationViolation { component: String, message: String },

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl MeridianError {
    /// Whether this error kind should be dropped from a fan-out rather than
    /// failing the whole request: the orchestrator never fails a query
    /// purely because one backend failed.
    #[must_use]
    pub const fn is_backend_droppable(&self) -> bool {
        matches!(
            self,
            Self::BackendTransient { .. } | Self::BackendUnavailable { .. }
        )
    }
}
