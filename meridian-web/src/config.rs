// ABOUTME: HTTP edge settings: bind address and CORS allow-list
// ABOUTME: An empty allow-list means permissive CORS (see server.rs); any non-empty list is enforced exactly

#[derive(Debug, Clone)]
pub struct WebConfig {
    pub bind_addr: String,
    pub cors_allowed_origins: Vec<String>,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            cors_allowed_origins: Vec::new(),
        }
    }
}

impl WebConfig {
    #[must_use]
    pub fn from_server_config(server: &meridian_config::ServerConfig) -> Self {
        Self {
            bind_addr: server.bind_addr.clone(),
            cors_allowed_origins: Vec::new(),
        }
    }
}
