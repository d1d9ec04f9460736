// ABOUTME: Document/Chunk/Hit types
// ABOUTME: Every entry, query, and result type here carries a flat tenant_id field

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use meridian_core::types::Embedding;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub tenant_id: String,
    pub title: String,
    pub source: String,
    pub content: String,
    pub metadata: HashMap<String, Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Namespace for `Uuid::new_v5`-derived document ids. Fixed so the same
/// `(tenant_id, source)` pair always yields the same id across process
/// restarts.
const DOCUMENT_ID_NAMESPACE: Uuid = Uuid::from_bytes([
    0x6d, 0x65, 0x72, 0x69, 0x64, 0x69, 0x61, 0x6e, 0x2d, 0x64, 0x6f, 0x63, 0x73, 0x2d, 0x00, 0x01,
]);

impl Document {
    /// The id is derived from `(tenant_id, source)` rather than generated
    /// fresh, so re-ingesting the same source for the same tenant yields the
    /// same document id and overwrites rather than duplicates.
    #[must_use]
    pub fn new(tenant_id: impl Into<String>, title: impl Into<String>, source: impl Into<String>, content: impl Into<String>) -> Self {
        let now = Utc::now();
        let tenant_id = tenant_id.into();
        let source = source.into();
        let id = Self::deterministic_id(&tenant_id, &source);
        Self {
            id,
            tenant_id,
            title: title.into(),
            source,
            content: content.into(),
            metadata: HashMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    #[must_use]
    pub fn deterministic_id(tenant_id: &str, source: &str) -> String {
        Uuid::new_v5(&DOCUMENT_ID_NAMESPACE, format!("{tenant_id}:{source}").as_bytes()).to_string()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    pub id: String,
    pub tenant_id: String,
    pub document_id: String,
    pub content: String,
    pub chunk_index: usize,
    pub token_count: Option<usize>,
    pub embedding: Embedding,
    pub metadata: HashMap<String, Value>,
}

impl Chunk {
    #[must_use]
    pub fn new(
        tenant_id: impl Into<String>,
        document_id: impl Into<String>,
        content: impl Into<String>,
        chunk_index: usize,
        embedding: Embedding,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            tenant_id: tenant_id.into(),
            document_id: document_id.into(),
            content: content.into(),
            chunk_index,
            token_count: None,
            embedding,
            metadata: HashMap::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hit {
    pub chunk_id: String,
    pub document_id: String,
    pub content: String,
    pub score: f32,
    pub document_title: String,
    pub document_source: String,
    pub metadata: HashMap<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VectorStoreStats {
    pub documents: usize,
    pub chunks: usize,
}
