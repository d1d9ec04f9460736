// ABOUTME: Enterprise search service adapter facade: document sets, targeted search, ingestion
// ABOUTME: EssAdapter is the seam the orchestrator and ingestion coordinator depend on

#![warn(missing_debug_implementations)]

mod binding;
mod client;
mod error;
mod ingest;
mod search;
mod types;

pub use binding::DocumentSetManager;
pub use client::EssHttpClient;
pub use error::{EssError, Result};
pub use ingest::{IngestClient, RetryPolicy};
pub use search::SearchClient;
pub use types::{CcPairStatus, EssBinding, EssDocument, IngestResult, SearchOutcome, SourceDoc};

use std::time::Duration;

use meridian_config::EssConfig;
use meridian_storage::SledBackend;

/// Combines the document-set lifecycle, retrying targeted search, and
/// file-upload ingestion behind one handle per the adapter's role as a
/// single protocol client for the external search service.
#[derive(Debug, Clone)]
pub struct EssAdapter {
    documents: DocumentSetManager,
    search: SearchClient,
    ingest: IngestClient,
    max_search_retries: u32,
}

impl EssAdapter {
    #[must_use]
    pub fn new(config: &EssConfig, backend: SledBackend) -> Self {
        let client = EssHttpClient::new(config);
        let policy = RetryPolicy {
            max_retries: config.max_retries,
            base_delay: Duration::from_millis(config.retry_base_delay_ms),
        };
        Self {
            documents: DocumentSetManager::new(client.clone(), backend),
            search: SearchClient::new(client.clone(), config.default_persona_id),
            ingest: IngestClient::new(client, policy),
            max_search_retries: config.max_retries.max(1),
        }
    }

    /// # Errors
    /// Propagates storage and transport failures from document-set provisioning.
    pub async fn ensure_document_set(&self, tenant_id: &str, cc_pair_id: i64) -> Result<String> {
        self.documents.ensure_document_set(tenant_id, cc_pair_id).await
    }

    /// `persona_id` overrides the configured default, sourced by callers
    /// from `Tenant.metadata["ess_persona_id"]` when a tenant customizes it.
    pub async fn search(&self, query: &str, document_set_id: &str, persona_id: Option<i64>) -> SearchOutcome {
        self.search.search(query, document_set_id, self.max_search_retries, persona_id).await
    }

    /// # Errors
    /// Propagates transport failures; the orchestrator uses this as a
    /// lower-confidence fallback when targeted search yields no answer.
    pub async fn simple_chat(&self, query: &str, persona_id: Option<i64>) -> Result<String> {
        self.search.simple_chat(query, persona_id).await
    }

    /// # Errors
    /// Propagates classified upload failures (fatal on auth/validation,
    /// exhausted-retries on transient failures).
    pub async fn ingest(&self, document: &EssDocument) -> Result<IngestResult> {
        self.ingest.ingest(document).await
    }

    /// Removes the persisted document-set binding for `tenant_id`. Used for
    /// tenant cascade delete.
    ///
    /// # Errors
    /// Propagates storage errors.
    pub async fn clear_tenant_binding(&self, tenant_id: &str) -> Result<usize> {
        self.documents.clear_tenant(tenant_id).await
    }
}

pub mod prelude {
    pub use crate::{EssAdapter, EssDocument, IngestResult, SearchOutcome, SourceDoc};
}
