// ABOUTME: Query flags: per-backend enable switches, top-k, thresholds, weights, deadlines

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct QueryFlags {
    pub vector_enabled: bool,
    pub graph_enabled: bool,
    pub ess_enabled: bool,
    pub top_k: usize,
    pub vector_threshold: f32,
    pub vector_weight: f32,
    pub ess_document_set_id: Option<String>,
    pub ess_max_retries: u32,
    pub ess_persona_id: Option<i64>,
    pub backend_deadline: Duration,
}

impl Default for QueryFlags {
    fn default() -> Self {
        Self {
            vector_enabled: true,
            graph_enabled: true,
            ess_enabled: false,
            top_k: 5,
            vector_threshold: 0.5,
            vector_weight: 0.7,
            ess_document_set_id: None,
            ess_max_retries: 3,
            ess_persona_id: None,
            backend_deadline: Duration::from_secs(10),
        }
    }
}
