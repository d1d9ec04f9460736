// ABOUTME: Wire-adjacent types for the enterprise search service adapter
// ABOUTME: Field names follow examples/original_source/onyx/service.py and onyx_cloud_integration.py

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Readiness fields read from `GET /api/manage/admin/cc-pair/{id}`, matching
/// `onyx_cloud_integration.py`'s polling fields.
#[derive(Debug, Clone, Deserialize)]
pub struct CcPairStatus {
    pub status: String,
    pub access_type: String,
    pub num_docs_indexed: u64,
    pub indexing: bool,
}

impl CcPairStatus {
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.status == "ACTIVE" && self.access_type == "public" && !self.indexing && self.num_docs_indexed > 0
    }
}

/// Per-tenant cached binding to a CC-pair's document set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EssBinding {
    pub cc_pair_id: i64,
    pub document_set_id: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct EssDocument {
    pub title: String,
    pub source: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceDoc {
    pub title: String,
    pub link: Option<String>,
    pub snippet: String,
}

#[derive(Debug, Clone)]
pub enum SearchOutcome {
    Success {
        answer: String,
        source_docs: Vec<SourceDoc>,
        attempt: u32,
    },
    Failure {
        error: String,
    },
}

#[derive(Debug, Clone)]
pub struct IngestResult {
    pub document_id: String,
    pub sections_count: usize,
    pub attempts: u32,
}
