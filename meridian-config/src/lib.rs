// ABOUTME: Central MeridianConfig, loaded defaults -> TOML -> environment
// ABOUTME: Covers every environment variable the process recognizes at startup

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse TOML config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Auth gate settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    pub refresh_ttl_days: i64,
    pub rate_limit_max_failures: u32,
    pub rate_limit_window_minutes: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "dev-insecure-secret-change-me".to_string(),
            token_ttl_hours: 24,
            refresh_ttl_days: 30,
            rate_limit_max_failures: 5,
            rate_limit_window_minutes: 15,
        }
    }
}

/// Vector store adapter settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct VectorConfig {
    pub dsn: String,
    pub embed_dim: usize,
    pub deadline_ms: u64,
}

impl Default for VectorConfig {
    fn default() -> Self {
        Self {
            dsn: "memory://local".to_string(),
            embed_dim: 768,
            deadline_ms: 3_000,
        }
    }
}

/// Graph store adapter settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GraphConfig {
    pub uri: String,
    pub user: String,
    pub password: String,
    pub deadline_ms: u64,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            uri: "memory://local".to_string(),
            user: String::new(),
            password: String::new(),
            deadline_ms: 5_000,
        }
    }
}

/// ESS adapter settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EssConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout_secs: u64,
    pub chat_deadline_ms: u64,
    pub ingest_deadline_ms: u64,
    pub max_retries: u32,
    pub retry_base_delay_ms: u64,
    pub default_persona_id: i64,
}

impl Default for EssConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: String::new(),
            timeout_secs: 30,
            chat_deadline_ms: 90_000,
            ingest_deadline_ms: 30_000,
            max_retries: 3,
            retry_base_delay_ms: 5_000,
            default_persona_id: 0,
        }
    }
}

/// Embedding + LLM collaborator settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ProvidersConfig {
    pub embed_model: String,
    pub embed_dim: usize,
    pub llm_model: String,
    pub embedding_base_url: String,
    pub llm_base_url: String,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            embed_model: "text-embedding-3-small".to_string(),
            embed_dim: 768,
            llm_model: "gpt-4o".to_string(),
            embedding_base_url: String::new(),
            llm_base_url: String::new(),
        }
    }
}

/// Orchestrator runtime settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub orchestrator_deadline_ms: u64,
    pub embedding_batch_parallelism: usize,
    pub db_pool_size: u32,
    pub backoff_cap_ms: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            orchestrator_deadline_ms: 120_000,
            embedding_batch_parallelism: 4,
            db_pool_size: 20,
            backoff_cap_ms: 30_000,
        }
    }
}

/// HTTP edge settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
        }
    }
}

/// Central configuration. Loaded defaults -> TOML file -> environment,
/// each stage overriding the previous one.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct MeridianConfig {
    pub auth: AuthConfig,
    pub vector: VectorConfig,
    pub graph: GraphConfig,
    pub ess: EssConfig,
    pub providers: ProvidersConfig,
    pub runtime: RuntimeConfig,
    pub server: ServerConfig,
}

impl MeridianConfig {
    /// Load from a TOML file, then apply environment variable overrides.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse TOML content, then apply environment overrides and validate.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let mut config: Self = toml::from_str(content)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Defaults with environment overrides applied; used when no config
    /// file is given.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Apply every recognized environment variable, leaving fields
    /// untouched when the variable is unset.
    pub fn apply_env_overrides(&mut self) {
        use std::env::var;

        if let Ok(v) = var("JWT_SECRET") {
            self.auth.jwt_secret = v;
        }
        if let Some(v) = var("TOKEN_TTL_HOURS").ok().and_then(|s| s.parse().ok()) {
            self.auth.token_ttl_hours = v;
        }
        if let Some(v) = var("REFRESH_TTL_DAYS").ok().and_then(|s| s.parse().ok()) {
            self.auth.refresh_ttl_days = v;
        }
        if let Ok(v) = var("VECTOR_DSN") {
            self.vector.dsn = v;
        }
        if let Ok(v) = var("GRAPH_URI") {
            self.graph.uri = v;
        }
        if let Ok(v) = var("GRAPH_USER") {
            self.graph.user = v;
        }
        if let Ok(v) = var("GRAPH_PASSWORD") {
            self.graph.password = v;
        }
        if let Ok(v) = var("ESS_BASE_URL") {
            self.ess.base_url = v;
        }
        if let Ok(v) = var("ESS_API_KEY") {
            self.ess.api_key = v;
        }
        if let Some(v) = var("ESS_TIMEOUT").ok().and_then(|s| s.parse().ok()) {
            self.ess.timeout_secs = v;
        }
        if let Ok(v) = var("EMBED_MODEL") {
            self.providers.embed_model = v;
        }
        if let Some(v) = var("EMBED_DIM").ok().and_then(|s| s.parse().ok()) {
            self.providers.embed_dim = v;
            self.vector.embed_dim = v;
        }
        if let Ok(v) = var("LLM_MODEL") {
            self.providers.llm_model = v;
        }
    }

    /// # Errors
    /// Returns `ConfigError::Invalid` if settings are internally
    /// inconsistent (e.g. mismatched embedding dimensions).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.providers.embed_dim != self.vector.embed_dim {
            return Err(ConfigError::Invalid(format!(
                "providers.embed_dim ({}) must match vector.embed_dim ({})",
                self.providers.embed_dim, self.vector.embed_dim
            )));
        }
        if self.auth.jwt_secret.is_empty() {
            return Err(ConfigError::Invalid(
                "auth.jwt_secret must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_internally_consistent() {
        let cfg = MeridianConfig::default();
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn env_override_updates_jwt_secret() {
        std::env::set_var("JWT_SECRET", "test-secret-value");
        let cfg = MeridianConfig::from_env().unwrap();
        assert_eq!(cfg.auth.jwt_secret, "test-secret-value");
        std::env::remove_var("JWT_SECRET");
    }

    #[test]
    fn mismatched_embed_dim_rejected() {
        let toml_src = r#"
            [providers]
            embed_dim = 1536
            [vector]
            embed_dim = 768
        "#;
        std::env::set_var("JWT_SECRET", "x");
        let result = MeridianConfig::from_toml(toml_src);
        std::env::remove_var("JWT_SECRET");
        assert!(result.is_err());
    }
}
