// ABOUTME: GraphStore trait — the swappable-backend seam, shaped after KnowledgeGraph
// ABOUTME: A real deployment would satisfy this with a graph database; this workspace ships one in-memory backend

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{
    Edge, EdgeDirection, Episode, EpisodeRef, FactEvent, GraphStats, Path, SearchHit, SearchKind,
};

#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Ingests an episode, producing entities/relationships/facts tagged
    /// with the episode's `tenant_id` before returning.
    async fn add_episode(&self, episode: Episode) -> Result<EpisodeRef>;

    async fn search(
        &self,
        tenant_id: &str,
        query: &str,
        kind: SearchKind,
        limit: usize,
    ) -> Result<Vec<SearchHit>>;

    async fn entity_relationships(
        &self,
        tenant_id: &str,
        entity_id: &str,
        direction: EdgeDirection,
        types: Option<&[String]>,
        limit: usize,
    ) -> Result<Vec<Edge>>;

    async fn entity_timeline(&self, tenant_id: &str, entity_id: &str, limit: usize) -> Result<Vec<FactEvent>>;

    async fn shortest_path(
        &self,
        tenant_id: &str,
        source_name: &str,
        target_name: &str,
        max_depth: usize,
    ) -> Result<Vec<Path>>;

    async fn stats(&self, tenant_id: &str) -> Result<GraphStats>;

    /// Removes every entity, relationship, and fact belonging to
    /// `tenant_id`. Used for tenant cascade delete; returns the number of
    /// rows removed across all three.
    async fn delete_tenant(&self, tenant_id: &str) -> Result<usize>;
}
