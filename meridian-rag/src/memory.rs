// ABOUTME: In-process reference VectorStorage: per-tenant brute-force cosine + lexical overlap
// ABOUTME: Stands in for pgvector/HNSW behind the same trait, consistent with the vector store being out-of-scope egress

use std::collections::HashMap;

use parking_lot::RwLock;

use crate::error::{RagError, Result};
use crate::store::VectorStorage;
use crate::types::{Chunk, Hit, VectorStoreStats};

fn lexical_overlap(query: &str, content: &str) -> f32 {
    let query_terms: std::collections::HashSet<String> =
        query.to_lowercase().split_whitespace().map(str::to_string).collect();
    if query_terms.is_empty() {
        return 0.0;
    }
    let content_terms: std::collections::HashSet<String> =
        content.to_lowercase().split_whitespace().map(str::to_string).collect();
    let overlap = query_terms.intersection(&content_terms).count();
    overlap as f32 / query_terms.len() as f32
}

fn hit_from_chunk(chunk: &Chunk, score: f32) -> Hit {
    let document_title = chunk
        .metadata
        .get("document_title")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();
    let document_source = chunk
        .metadata
        .get("document_source")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();
    Hit {
        chunk_id: chunk.id.clone(),
        document_id: chunk.document_id.clone(),
        content: chunk.content.clone(),
        score,
        document_title,
        document_source,
        metadata: chunk.metadata.clone(),
    }
}

#[derive(Debug, Default)]
struct TenantIndex {
    chunks: HashMap<String, Chunk>,
}

/// Per-tenant brute-force index. Fine for the reference implementation's
/// target scale; a production deployment satisfies the same trait with
/// pgvector or an HNSW-backed store instead.
#[derive(Debug, Default)]
pub struct InMemoryVectorStore {
    tenants: RwLock<HashMap<String, TenantIndex>>,
}

impl InMemoryVectorStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl VectorStorage for InMemoryVectorStore {
    async fn insert_chunks(&self, tenant_id: &str, chunks: Vec<Chunk>) -> Result<()> {
        for chunk in &chunks {
            if chunk.tenant_id != tenant_id {
                return Err(RagError::MixedTenantBatch {
                    expected: tenant_id.to_string(),
                    found: chunk.tenant_id.clone(),
                });
            }
        }
        let mut tenants = self.tenants.write();
        let index = tenants.entry(tenant_id.to_string()).or_default();
        for chunk in chunks {
            index.chunks.insert(chunk.id.clone(), chunk);
        }
        Ok(())
    }

    async fn vector_search(
        &self,
        tenant_id: &str,
        query_vec: &[f32],
        top_k: usize,
        threshold: f32,
    ) -> Result<Vec<Hit>> {
        let tenants = self.tenants.read();
        let Some(index) = tenants.get(tenant_id) else {
            return Ok(Vec::new());
        };

        let mut scored: Vec<Hit> = index
            .chunks
            .values()
            .filter(|c| c.tenant_id == tenant_id)
            .filter_map(|c| {
                let sim = c.embedding.cosine_similarity(&meridian_core::types::Embedding::new(query_vec.to_vec()));
                (sim >= threshold).then(|| hit_from_chunk(c, sim))
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);
        Ok(scored)
    }

    async fn hybrid_search(
        &self,
        tenant_id: &str,
        query_vec: &[f32],
        query_text: &str,
        top_k: usize,
        threshold: f32,
        vector_weight: f32,
    ) -> Result<Vec<Hit>> {
        let tenants = self.tenants.read();
        let Some(index) = tenants.get(tenant_id) else {
            return Ok(Vec::new());
        };

        let query_embedding = meridian_core::types::Embedding::new(query_vec.to_vec());
        let mut scored: Vec<Hit> = index
            .chunks
            .values()
            .filter(|c| c.tenant_id == tenant_id)
            .filter_map(|c| {
                let vec_sim = c.embedding.cosine_similarity(&query_embedding);
                if vec_sim < threshold {
                    return None;
                }
                let lex_sim = lexical_overlap(query_text, &c.content);
                let combined = vector_weight * vec_sim + (1.0 - vector_weight) * lex_sim;
                Some(hit_from_chunk(c, combined))
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_k);
        Ok(scored)
    }

    async fn delete_document(&self, tenant_id: &str, document_id: &str) -> Result<usize> {
        let mut tenants = self.tenants.write();
        let Some(index) = tenants.get_mut(tenant_id) else {
            return Ok(0);
        };
        let before = index.chunks.len();
        index.chunks.retain(|_, c| c.document_id != document_id);
        Ok(before - index.chunks.len())
    }

    async fn delete_tenant(&self, tenant_id: &str) -> Result<usize> {
        let mut tenants = self.tenants.write();
        Ok(tenants.remove(tenant_id).map_or(0, |index| index.chunks.len()))
    }

    async fn stats(&self, tenant_id: &str) -> Result<VectorStoreStats> {
        let tenants = self.tenants.read();
        let Some(index) = tenants.get(tenant_id) else {
            return Ok(VectorStoreStats::default());
        };
        let documents: std::collections::HashSet<&str> =
            index.chunks.values().map(|c| c.document_id.as_str()).collect();
        Ok(VectorStoreStats {
            documents: documents.len(),
            chunks: index.chunks.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use meridian_core::types::Embedding;

    fn chunk(tenant_id: &str, document_id: &str, content: &str, vector: Vec<f32>) -> Chunk {
        Chunk::new(tenant_id, document_id, content, 0, Embedding::new(vector))
    }

    #[tokio::test]
    async fn insert_rejects_mixed_tenant_batch() {
        let store = InMemoryVectorStore::new();
        let chunks = vec![
            chunk("acme", "doc1", "hello", vec![1.0, 0.0]),
            chunk("globex", "doc1", "world", vec![0.0, 1.0]),
        ];
        let err = store.insert_chunks("acme", chunks).await.unwrap_err();
        assert!(matches!(err, RagError::MixedTenantBatch { .. }));
    }

    #[tokio::test]
    async fn vector_search_is_isolated_per_tenant() {
        let store = InMemoryVectorStore::new();
        store
            .insert_chunks("acme", vec![chunk("acme", "doc1", "acme content", vec![1.0, 0.0])])
            .await
            .unwrap();
        store
            .insert_chunks("globex", vec![chunk("globex", "doc1", "globex content", vec![1.0, 0.0])])
            .await
            .unwrap();

        let acme_hits = store.vector_search("acme", &[1.0, 0.0], 10, 0.0).await.unwrap();
        assert_eq!(acme_hits.len(), 1);
        assert_eq!(acme_hits[0].content, "acme content");
    }

    #[tokio::test]
    async fn vector_search_respects_threshold() {
        let store = InMemoryVectorStore::new();
        store
            .insert_chunks(
                "acme",
                vec![
                    chunk("acme", "doc1", "aligned", vec![1.0, 0.0]),
                    chunk("acme", "doc1", "orthogonal", vec![0.0, 1.0]),
                ],
            )
            .await
            .unwrap();

        let hits = store.vector_search("acme", &[1.0, 0.0], 10, 0.9).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].content, "aligned");
    }

    #[tokio::test]
    async fn hybrid_search_combines_vector_and_lexical_scores() {
        let store = InMemoryVectorStore::new();
        store
            .insert_chunks(
                "acme",
                vec![chunk("acme", "doc1", "rust systems programming", vec![1.0, 0.0])],
            )
            .await
            .unwrap();

        let hits = store
            .hybrid_search("acme", &[1.0, 0.0], "rust programming", 10, 0.0, 0.5)
            .await
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert!(hits[0].score > 0.0);
    }

    #[tokio::test]
    async fn delete_document_removes_only_its_chunks() {
        let store = InMemoryVectorStore::new();
        store
            .insert_chunks(
                "acme",
                vec![
                    chunk("acme", "doc1", "a", vec![1.0, 0.0]),
                    chunk("acme", "doc2", "b", vec![0.0, 1.0]),
                ],
            )
            .await
            .unwrap();
        let removed = store.delete_document("acme", "doc1").await.unwrap();
        assert_eq!(removed, 1);
        let stats = store.stats("acme").await.unwrap();
        assert_eq!(stats.chunks, 1);
    }

    #[tokio::test]
    async fn delete_tenant_removes_all_its_chunks_and_leaves_others() {
        let store = InMemoryVectorStore::new();
        store
            .insert_chunks(
                "acme",
                vec![
                    chunk("acme", "doc1", "a", vec![1.0, 0.0]),
                    chunk("acme", "doc2", "b", vec![0.0, 1.0]),
                ],
            )
            .await
            .unwrap();
        store
            .insert_chunks("globex", vec![chunk("globex", "doc1", "c", vec![1.0, 1.0])])
            .await
            .unwrap();

        let removed = store.delete_tenant("acme").await.unwrap();
        assert_eq!(removed, 2);
        assert_eq!(store.stats("acme").await.unwrap().chunks, 0);
        assert_eq!(store.stats("globex").await.unwrap().chunks, 1);
    }
}
