// ABOUTME: IngestionResult: per-backend success/failure, partial failure permitted

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BackendOutcome {
    Succeeded { count: usize },
    Skipped,
    Failed { reason: String },
}

impl BackendOutcome {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct IngestionResult {
    pub document_id: String,
    pub chunks_created: usize,
    pub vector: BackendOutcome,
    pub graph: BackendOutcome,
    pub ess: BackendOutcome,
}

impl IngestionResult {
    /// The ingest is considered successful for the caller as long as at
    /// least one backend accepted it — the caller decides whether to retry
    /// the backends that failed.
    #[must_use]
    pub fn any_backend_succeeded(&self) -> bool {
        self.vector.is_success() || self.graph.is_success() || self.ess.is_success()
    }
}
