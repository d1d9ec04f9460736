// ABOUTME: Agent runtime errors: a failed tool call never aborts the loop, only a malformed one does
// ABOUTME: AgentError::Cancelled surfaces CancellationToken signals through the same Result seam

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AgentError>;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    #[error("invalid arguments for tool {tool}: {message}")]
    InvalidArguments { tool: String, message: String },

    #[error("step budget of {0} exhausted without a terminal response")]
    StepBudgetExhausted(usize),

    #[error("request cancelled")]
    Cancelled,

    #[error("llm collaborator error: {0}")]
    Llm(String),

    #[error("tenant unavailable: {0}")]
    TenantUnavailable(String),
}

impl From<AgentError> for meridian_core::error::MeridianError {
    fn from(err: AgentError) -> Self {
        match err {
            AgentError::UnknownTool(name) => Self::ValidationFailed(format!("unknown tool: {name}")),
            AgentError::InvalidArguments { tool, message } => {
                Self::ValidationFailed(format!("tool {tool}: {message}"))
            }
            AgentError::StepBudgetExhausted(n) => Self::Internal(format!("step budget of {n} exhausted")),
            AgentError::Cancelled => Self::Internal("request cancelled".to_string()),
            AgentError::Llm(msg) => Self::BackendUnavailable {
                backend: "llm".to_string(),
                message: msg,
            },
            AgentError::TenantUnavailable(id) => Self::TenantUnavailable(id),
        }
    }
}
