// ABOUTME: VectorStorage trait — the swappable-backend seam
// ABOUTME: every method takes tenant_id explicitly rather than relying on an ambient scope

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{Chunk, Hit, VectorStoreStats};

#[async_trait]
pub trait VectorStorage: Send + Sync {
    /// Inserts a batch of chunks, all belonging to the same document and
    /// tenant. Rejects a batch whose chunks don't share one `tenant_id`.
    async fn insert_chunks(&self, tenant_id: &str, chunks: Vec<Chunk>) -> Result<()>;

    /// Pure vector k-NN: cosine similarity, filtered to `threshold`.
    async fn vector_search(
        &self,
        tenant_id: &str,
        query_vec: &[f32],
        top_k: usize,
        threshold: f32,
    ) -> Result<Vec<Hit>>;

    /// Combined vector + lexical score:
    /// `vector_weight * vec_sim + (1 - vector_weight) * lex_sim`.
    async fn hybrid_search(
        &self,
        tenant_id: &str,
        query_vec: &[f32],
        query_text: &str,
        top_k: usize,
        threshold: f32,
        vector_weight: f32,
    ) -> Result<Vec<Hit>>;

    async fn delete_document(&self, tenant_id: &str, document_id: &str) -> Result<usize>;

    /// Removes every chunk belonging to `tenant_id`, regardless of document.
    /// Used for tenant cascade delete; returns the number of chunks removed.
    async fn delete_tenant(&self, tenant_id: &str) -> Result<usize>;

    async fn stats(&self, tenant_id: &str) -> Result<VectorStoreStats>;
}
