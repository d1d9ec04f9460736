// ABOUTME: Ingestion coordinator: normalize -> chunk -> embed -> entity hints -> dual-write -> report
// ABOUTME: Stages run in order; a failure in one backend write does not unwind the others

use std::sync::Arc;

use chrono::Utc;
use meridian_core::types::Embedding;
use meridian_ess::{EssAdapter, EssDocument};
use meridian_graph::{Episode, GraphStore};
use meridian_providers::EmbeddingProvider;
use meridian_rag::{chunk_fixed_size, Chunk, ChunkingConfig, Document, VectorStorage};
use meridian_tenancy::TenantRegistry;
use uuid::Uuid;

use crate::error::{IngestionError, Result};
use crate::hints::extract_hints;
use crate::normalize::normalize;
use crate::result::{BackendOutcome, IngestionResult};

/// Episodes above this token budget are sent as one episode per document's
/// remainder rather than one per chunk, to keep graph writes from ballooning
/// on very large documents.
const EPISODE_TOKEN_CEILING: usize = 2_000;
const EMBED_BATCH_SIZE: usize = 32;

#[derive(Debug, Clone)]
pub struct IngestionConfig {
    pub chunking: ChunkingConfig,
    pub ess_enabled: bool,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            chunking: ChunkingConfig::default(),
            ess_enabled: false,
        }
    }
}

pub struct IngestionCoordinator {
    tenants: Arc<TenantRegistry>,
    vector_store: Arc<dyn VectorStorage>,
    graph_store: Arc<dyn GraphStore>,
    embedder: Arc<dyn EmbeddingProvider>,
    ess: Option<Arc<EssAdapter>>,
    config: IngestionConfig,
}

impl std::fmt::Debug for IngestionCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IngestionCoordinator")
            .field("config", &self.config)
            .field("ess_enabled", &self.ess.is_some())
            .finish_non_exhaustive()
    }
}

impl IngestionCoordinator {
    #[must_use]
    pub fn new(
        tenants: Arc<TenantRegistry>,
        vector_store: Arc<dyn VectorStorage>,
        graph_store: Arc<dyn GraphStore>,
        embedder: Arc<dyn EmbeddingProvider>,
        ess: Option<Arc<EssAdapter>>,
        config: IngestionConfig,
    ) -> Self {
        Self {
            tenants,
            vector_store,
            graph_store,
            embedder,
            ess,
            config,
        }
    }

    /// # Errors
    /// Returns an error for fatal input-shape problems (empty document,
    /// embedding dimension mismatch) and when the tenant's document quota
    /// would be exceeded by a genuinely new document. Backend write failures
    /// are captured in the returned `IngestionResult`, never raised.
    ///
    /// Re-ingesting the same `(tenant_id, filename)` pair replaces the prior
    /// document's chunks rather than duplicating them, since the document id
    /// is derived deterministically from that pair.
    pub async fn ingest(&self, tenant_id: &str, filename: &str, raw_content: &str) -> Result<IngestionResult> {
        let normalized = normalize(raw_content, filename);
        let text_chunks = chunk_fixed_size(&normalized.content, &self.config.chunking);
        if text_chunks.is_empty() {
            return Err(IngestionError::EmptyDocument);
        }

        let document = Document::new(tenant_id, normalized.title.clone(), filename, normalized.content.clone());

        let removed = self.vector_store.delete_document(tenant_id, &document.id).await?;
        let is_replace = removed > 0;
        if !is_replace {
            self.check_quota(tenant_id).await?;
        }

        let document_hints = extract_hints(&normalized.content);
        let hint_fields = document_hints.as_metadata_fields();

        let texts: Vec<String> = text_chunks.iter().map(|c| c.content.clone()).collect();
        let embeddings = self.embed_all(&texts).await?;

        let mut chunks = Vec::with_capacity(text_chunks.len());
        for ((text_chunk, embedding), index) in text_chunks.into_iter().zip(embeddings).zip(0usize..) {
            let mut chunk = Chunk::new(tenant_id, document.id.clone(), text_chunk.content, index, embedding);
            chunk.token_count = Some(text_chunk.token_count);
            for (key, value) in &hint_fields {
                chunk.metadata.insert((*key).to_string(), serde_json::Value::String(value.clone()));
            }
            chunk
                .metadata
                .insert("document_title".to_string(), serde_json::Value::String(document.title.clone()));
            chunk
                .metadata
                .insert("document_source".to_string(), serde_json::Value::String(document.source.clone()));
            chunks.push(chunk);
        }

        let vector = self.write_vector(tenant_id, chunks.clone()).await;
        let graph = self.write_graph(tenant_id, &document, &chunks).await;
        let ess = self.write_ess(tenant_id, &document).await;

        Ok(IngestionResult {
            document_id: document.id,
            chunks_created: chunks.len(),
            vector,
            graph,
            ess,
        })
    }

    /// Rejects ingestion of a new document once the tenant's `max_documents`
    /// quota is already met. Only called for documents that don't already
    /// exist, so re-ingesting an existing document never trips the quota.
    async fn check_quota(&self, tenant_id: &str) -> Result<()> {
        let Some(tenant) = self.tenants.get(tenant_id).await? else {
            return Ok(());
        };
        let Some(max_documents) = tenant.quotas.max_documents else {
            return Ok(());
        };
        let stats = self.vector_store.stats(tenant_id).await?;
        if stats.documents as u64 >= max_documents {
            return Err(IngestionError::QuotaExceeded(format!(
                "tenant {tenant_id} has reached its document quota of {max_documents}"
            )));
        }
        Ok(())
    }

    async fn embed_all(&self, texts: &[String]) -> Result<Vec<Embedding>> {
        let dimension = self.embedder.dimension();
        let mut out = Vec::with_capacity(texts.len());
        for batch in texts.chunks(EMBED_BATCH_SIZE) {
            let batch_vec = batch.to_vec();
            let embedded = self.embedder.embed(&batch_vec).await?;
            for embedding in embedded {
                if embedding.dim() != dimension {
                    return Err(IngestionError::DimensionMismatch {
                        expected: dimension,
                        got: embedding.dim(),
                    });
                }
                out.push(embedding);
            }
        }
        Ok(out)
    }

    async fn write_vector(&self, tenant_id: &str, chunks: Vec<Chunk>) -> BackendOutcome {
        let count = chunks.len();
        match self.vector_store.insert_chunks(tenant_id, chunks).await {
            Ok(()) => BackendOutcome::Succeeded { count },
            Err(e) => {
                tracing::warn!(tenant_id, error = %e, "vector store write failed");
                BackendOutcome::Failed { reason: e.to_string() }
            }
        }
    }

    async fn write_graph(&self, tenant_id: &str, document: &Document, chunks: &[Chunk]) -> BackendOutcome {
        let groups = group_for_episodes(chunks);
        let mut written = 0;
        for group in &groups {
            let content: String = group.iter().map(|c| c.content.as_str()).collect::<Vec<_>>().join("\n\n");
            let episode = Episode {
                tenant_id: tenant_id.to_string(),
                name: format!("{}#{}", document.title, Uuid::new_v4()),
                content,
                reference_time: Utc::now(),
                source_description: document.source.clone(),
            };
            match self.graph_store.add_episode(episode).await {
                Ok(_) => written += 1,
                Err(e) => {
                    tracing::warn!(tenant_id, error = %e, "graph store write failed for one episode");
                }
            }
        }
        if written == 0 {
            BackendOutcome::Failed {
                reason: "no episodes were accepted".to_string(),
            }
        } else {
            BackendOutcome::Succeeded { count: written }
        }
    }

    async fn write_ess(&self, tenant_id: &str, document: &Document) -> BackendOutcome {
        if !self.config.ess_enabled {
            return BackendOutcome::Skipped;
        }
        let Some(ess) = &self.ess else {
            return BackendOutcome::Skipped;
        };
        let doc = EssDocument {
            title: document.title.clone(),
            source: document.source.clone(),
            content: document.content.clone(),
        };
        match ess.ingest(&doc).await {
            Ok(result) => BackendOutcome::Succeeded {
                count: result.sections_count,
            },
            Err(e) => {
                tracing::warn!(tenant_id, error = %e, "ess ingest failed");
                BackendOutcome::Failed { reason: e.to_string() }
            }
        }
    }
}

/// One episode per chunk normally; chunks are merged into a single episode
/// group when their combined size would exceed the token ceiling, splitting
/// at a safe boundary rather than mid-chunk.
fn group_for_episodes(chunks: &[Chunk]) -> Vec<Vec<&Chunk>> {
    let mut groups: Vec<Vec<&Chunk>> = Vec::new();
    let mut current: Vec<&Chunk> = Vec::new();
    let mut current_tokens = 0usize;

    for chunk in chunks {
        let tokens = chunk.token_count.unwrap_or_else(|| chunk.content.split_whitespace().count());
        if !current.is_empty() && current_tokens + tokens > EPISODE_TOKEN_CEILING {
            groups.push(std::mem::take(&mut current));
            current_tokens = 0;
        }
        current_tokens += tokens;
        current.push(chunk);
    }
    if !current.is_empty() {
        groups.push(current);
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use meridian_graph::InMemoryGraphStore;
    use meridian_rag::InMemoryVectorStore;
    use meridian_storage::SledBackend;
    use meridian_tenancy::TenantQuotas;

    fn chunk(content: &str, tokens: usize) -> Chunk {
        let mut c = Chunk::new("acme", "doc-1", content.to_string(), 0, Embedding::new(vec![0.0; 4]));
        c.token_count = Some(tokens);
        c
    }

    #[derive(Debug)]
    struct FakeEmbedder;

    #[async_trait]
    impl EmbeddingProvider for FakeEmbedder {
        async fn embed(&self, texts: &[String]) -> meridian_providers::Result<Vec<Embedding>> {
            Ok(texts.iter().map(|_| Embedding::new(vec![0.1; 4])).collect())
        }

        fn dimension(&self) -> usize {
            4
        }
    }

    async fn test_coordinator(max_documents: Option<u64>) -> IngestionCoordinator {
        let tenants = Arc::new(TenantRegistry::new(SledBackend::temporary().unwrap()));
        tenants
            .create(
                "acme",
                "Acme Corp",
                TenantQuotas {
                    max_documents,
                    max_storage_mb: None,
                },
                std::collections::HashMap::new(),
            )
            .await
            .unwrap();
        let vector_store: Arc<dyn VectorStorage> = Arc::new(InMemoryVectorStore::new());
        let graph_store: Arc<dyn GraphStore> = Arc::new(InMemoryGraphStore::new());
        IngestionCoordinator::new(tenants, vector_store, graph_store, Arc::new(FakeEmbedder), None, IngestionConfig::default())
    }

    #[tokio::test]
    async fn reingesting_the_same_source_replaces_rather_than_duplicates() {
        let coordinator = test_coordinator(None).await;
        let first = coordinator.ingest("acme", "report.txt", "the quarterly report content").await.unwrap();
        let second = coordinator.ingest("acme", "report.txt", "the revised quarterly report content").await.unwrap();
        assert_eq!(first.document_id, second.document_id);
        let stats = coordinator.vector_store.stats("acme").await.unwrap();
        assert_eq!(stats.documents, 1);
    }

    #[tokio::test]
    async fn new_document_past_quota_is_rejected() {
        let coordinator = test_coordinator(Some(1)).await;
        coordinator.ingest("acme", "first.txt", "first document content").await.unwrap();
        let err = coordinator.ingest("acme", "second.txt", "second document content").await.unwrap_err();
        assert!(matches!(err, IngestionError::QuotaExceeded(_)));
    }

    #[tokio::test]
    async fn reingest_under_quota_does_not_count_as_a_new_document() {
        let coordinator = test_coordinator(Some(1)).await;
        coordinator.ingest("acme", "first.txt", "first document content").await.unwrap();
        coordinator.ingest("acme", "first.txt", "first document content, revised").await.unwrap();
    }

    #[test]
    fn groups_small_chunks_into_one_episode() {
        let chunks = vec![chunk("a", 100), chunk("b", 100)];
        let groups = group_for_episodes(&chunks);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].len(), 2);
    }

    #[test]
    fn splits_into_multiple_episodes_past_ceiling() {
        let chunks = vec![chunk("a", 1_500), chunk("b", 1_500), chunk("c", 1_500)];
        let groups = group_for_episodes(&chunks);
        assert!(groups.len() >= 2);
    }
}
