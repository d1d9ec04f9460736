// ABOUTME: Exit-code mapping for process failures

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] meridian_config::ConfigError),

    #[error("runtime initialization failed: {0}")]
    Init(String),
}

impl CliError {
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 1,
            Self::Init(_) => 2,
        }
    }
}
