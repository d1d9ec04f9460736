// ABOUTME: In-process reference GraphStore: per-tenant dashmaps, brute-force path search
// ABOUTME: Stands in for a real graph database behind the same trait

use std::collections::{HashMap, HashSet, VecDeque};

use chrono::Utc;
use dashmap::DashMap;
use parking_lot::Mutex;

use crate::error::{GraphError, Result};
use crate::store::GraphStore;
use crate::types::{
    Edge, EdgeDirection, Entity, Episode, EpisodeRef, Fact, FactEvent, GraphStats, Path,
    Relationship, SearchHit, SearchKind,
};

#[derive(Default)]
struct TenantGraph {
    entities: HashMap<String, Entity>,
    relationships: HashMap<String, Relationship>,
    facts: HashMap<String, Fact>,
    episode_count: usize,
}

/// A trivial rule-based extractor standing in for the real entity/relation
/// extraction pipeline: every capitalized word in `content` becomes an
/// entity mention, consecutive mentions become `mentioned_with`
/// relationships, and the episode itself becomes one Fact per entity.
fn extract(episode: &Episode) -> (Vec<Entity>, Vec<Relationship>, Vec<Fact>) {
    let mentions: Vec<&str> = episode
        .content
        .split_whitespace()
        .filter(|w| w.chars().next().is_some_and(char::is_uppercase))
        .collect();

    let mut seen = HashSet::new();
    let mut entities = Vec::new();
    for word in &mentions {
        let name = word.trim_matches(|c: char| !c.is_alphanumeric());
        if name.is_empty() || !seen.insert(name.to_string()) {
            continue;
        }
        entities.push(
            Entity::new(episode.tenant_id.clone(), name, "mention")
                .with_properties_from(episode),
        );
    }

    let mut relationships = Vec::new();
    for pair in entities.windows(2) {
        relationships.push(Relationship::new(
            episode.tenant_id.clone(),
            pair[0].id.clone(),
            pair[1].id.clone(),
            "mentioned_with",
        ));
    }

    let facts = entities
        .iter()
        .map(|e| {
            let mut fact = Fact::new(
                episode.tenant_id.clone(),
                format!("{} mentions {}", episode.name, e.name),
                vec![e.id.clone()],
            );
            fact.valid_at = episode.reference_time;
            fact
        })
        .collect();

    (entities, relationships, facts)
}

trait EntityExt {
    fn with_properties_from(self, episode: &Episode) -> Entity;
}

impl EntityExt for Entity {
    fn with_properties_from(mut self, episode: &Episode) -> Entity {
        self.event_time = Some(episode.reference_time);
        self
    }
}

/// Per-tenant in-memory knowledge graph. Every method takes `tenant_id` as
/// an argument and never touches another tenant's map, giving the same
/// namespace-prefix isolation a real backend is expected to provide.
#[derive(Debug, Default)]
pub struct InMemoryGraphStore {
    tenants: DashMap<String, Mutex<TenantGraph>>,
}

impl InMemoryGraphStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn tenant(&self, tenant_id: &str) -> dashmap::mapref::one::Ref<'_, String, Mutex<TenantGraph>> {
        self.tenants
            .entry(tenant_id.to_string())
            .or_default();
        self.tenants.get(tenant_id).expect("just inserted")
    }
}

#[async_trait::async_trait]
impl GraphStore for InMemoryGraphStore {
    async fn add_episode(&self, episode: Episode) -> Result<EpisodeRef> {
        let (entities, relationships, facts) = extract(&episode);

        for e in &entities {
            if e.tenant_id != episode.tenant_id {
                return Err(GraphError::IsolationViolation(
                    "extracted entity tenant_id mismatch".to_string(),
                ));
            }
        }

        let graph = self.tenant(&episode.tenant_id);
        let mut guard = graph.lock();
        let entity_ids: Vec<String> = entities.iter().map(|e| e.id.clone()).collect();
        let relationship_ids: Vec<String> = relationships.iter().map(|r| r.id.clone()).collect();
        let fact_ids: Vec<String> = facts.iter().map(|f| f.id.clone()).collect();

        for e in entities {
            guard.entities.insert(e.id.clone(), e);
        }
        for r in relationships {
            guard.relationships.insert(r.id.clone(), r);
        }
        for f in facts {
            guard.facts.insert(f.id.clone(), f);
        }
        guard.episode_count += 1;

        Ok(EpisodeRef {
            episode_id: uuid::Uuid::new_v4().to_string(),
            entity_ids,
            relationship_ids,
            fact_ids,
        })
    }

    async fn search(
        &self,
        tenant_id: &str,
        query: &str,
        kind: SearchKind,
        limit: usize,
    ) -> Result<Vec<SearchHit>> {
        let graph = self.tenant(tenant_id);
        let guard = graph.lock();
        let needle = query.to_lowercase();
        let hits = match kind {
            SearchKind::Entities | SearchKind::Similarity => guard
                .entities
                .values()
                .filter(|e| e.tenant_id == tenant_id && e.name.to_lowercase().contains(&needle))
                .take(limit)
                .cloned()
                .map(SearchHit::Entity)
                .collect(),
            SearchKind::Facts => guard
                .facts
                .values()
                .filter(|f| f.tenant_id == tenant_id && f.statement.to_lowercase().contains(&needle))
                .take(limit)
                .cloned()
                .map(SearchHit::Fact)
                .collect(),
        };
        Ok(hits)
    }

    async fn entity_relationships(
        &self,
        tenant_id: &str,
        entity_id: &str,
        direction: EdgeDirection,
        types: Option<&[String]>,
        limit: usize,
    ) -> Result<Vec<Edge>> {
        let graph = self.tenant(tenant_id);
        let guard = graph.lock();
        let mut edges = Vec::new();
        for rel in guard.relationships.values() {
            if rel.tenant_id != tenant_id {
                continue;
            }
            if let Some(allowed) = types {
                if !allowed.iter().any(|t| t == &rel.relationship_type) {
                    continue;
                }
            }
            let outgoing = rel.from_entity == entity_id;
            let incoming = rel.to_entity == entity_id;
            let matches = match direction {
                EdgeDirection::Out => outgoing,
                EdgeDirection::In => incoming,
                EdgeDirection::Both => outgoing || incoming,
            };
            if !matches {
                continue;
            }
            let other = if outgoing { &rel.to_entity } else { &rel.from_entity };
            edges.push(Edge {
                relationship: rel.clone(),
                other_entity_id: other.clone(),
                direction: if outgoing { EdgeDirection::Out } else { EdgeDirection::In },
            });
            if edges.len() >= limit {
                break;
            }
        }
        Ok(edges)
    }

    async fn entity_timeline(&self, tenant_id: &str, entity_id: &str, limit: usize) -> Result<Vec<FactEvent>> {
        let graph = self.tenant(tenant_id);
        let guard = graph.lock();
        let mut events: Vec<FactEvent> = guard
            .facts
            .values()
            .filter(|f| f.tenant_id == tenant_id && f.entity_ids.iter().any(|id| id == entity_id))
            .cloned()
            .map(|fact| FactEvent { fact })
            .collect();
        events.sort_by(|a, b| b.fact.valid_at.cmp(&a.fact.valid_at));
        events.truncate(limit);
        Ok(events)
    }

    async fn shortest_path(
        &self,
        tenant_id: &str,
        source_name: &str,
        target_name: &str,
        max_depth: usize,
    ) -> Result<Vec<Path>> {
        let graph = self.tenant(tenant_id);
        let guard = graph.lock();

        let find_id = |name: &str| {
            guard
                .entities
                .values()
                .find(|e| e.tenant_id == tenant_id && e.name == name)
                .map(|e| e.id.clone())
        };
        let Some(source_id) = find_id(source_name) else {
            return Ok(Vec::new());
        };
        let Some(target_id) = find_id(target_name) else {
            return Ok(Vec::new());
        };

        let mut adjacency: HashMap<&str, Vec<(&str, &str)>> = HashMap::new();
        for rel in guard.relationships.values() {
            if rel.tenant_id != tenant_id {
                continue;
            }
            adjacency
                .entry(&rel.from_entity)
                .or_default()
                .push((&rel.to_entity, &rel.id));
            adjacency
                .entry(&rel.to_entity)
                .or_default()
                .push((&rel.from_entity, &rel.id));
        }

        let mut queue = VecDeque::new();
        queue.push_back((source_id.clone(), vec![source_id.clone()], Vec::<String>::new()));
        let mut visited = HashSet::new();
        visited.insert(source_id.clone());

        while let Some((current, entity_path, rel_path)) = queue.pop_front() {
            if current == target_id {
                return Ok(vec![Path {
                    entity_ids: entity_path,
                    relationship_ids: rel_path,
                }]);
            }
            if entity_path.len() > max_depth {
                continue;
            }
            if let Some(neighbors) = adjacency.get(current.as_str()) {
                for (next, rel_id) in neighbors {
                    if visited.insert((*next).to_string()) {
                        let mut next_entities = entity_path.clone();
                        next_entities.push((*next).to_string());
                        let mut next_rels = rel_path.clone();
                        next_rels.push((*rel_id).to_string());
                        queue.push_back(((*next).to_string(), next_entities, next_rels));
                    }
                }
            }
        }
        Ok(Vec::new())
    }

    async fn stats(&self, tenant_id: &str) -> Result<GraphStats> {
        let graph = self.tenant(tenant_id);
        let guard = graph.lock();
        let mut by_entity_type = HashMap::new();
        for e in guard.entities.values().filter(|e| e.tenant_id == tenant_id) {
            *by_entity_type.entry(e.entity_type.clone()).or_insert(0) += 1;
        }
        Ok(GraphStats {
            entities: guard.entities.values().filter(|e| e.tenant_id == tenant_id).count(),
            relationships: guard.relationships.values().filter(|r| r.tenant_id == tenant_id).count(),
            facts: guard.facts.values().filter(|f| f.tenant_id == tenant_id).count(),
            episodes: guard.episode_count,
            by_entity_type,
        })
    }

    async fn delete_tenant(&self, tenant_id: &str) -> Result<usize> {
        let Some((_, graph)) = self.tenants.remove(tenant_id) else {
            return Ok(0);
        };
        let graph = graph.into_inner();
        Ok(graph.entities.len() + graph.relationships.len() + graph.facts.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn episode(tenant_id: &str, content: &str) -> Episode {
        Episode {
            tenant_id: tenant_id.to_string(),
            name: "test episode".to_string(),
            content: content.to_string(),
            reference_time: Utc::now(),
            source_description: "unit test".to_string(),
        }
    }

    #[tokio::test]
    async fn add_episode_extracts_entities_and_tags_tenant() {
        let store = InMemoryGraphStore::new();
        let episode_ref = store
            .add_episode(episode("acme", "Rust and Tokio power this service"))
            .await
            .unwrap();
        assert!(!episode_ref.entity_ids.is_empty());

        let stats = store.stats("acme").await.unwrap();
        assert_eq!(stats.entities, episode_ref.entity_ids.len());
        assert_eq!(stats.episodes, 1);
    }

    #[tokio::test]
    async fn search_is_isolated_per_tenant() {
        let store = InMemoryGraphStore::new();
        store
            .add_episode(episode("acme", "Rust is a systems language"))
            .await
            .unwrap();
        store
            .add_episode(episode("globex", "Rust is also used at Globex"))
            .await
            .unwrap();

        let acme_hits = store
            .search("acme", "rust", SearchKind::Entities, 10)
            .await
            .unwrap();
        let globex_hits = store
            .search("globex", "rust", SearchKind::Entities, 10)
            .await
            .unwrap();
        assert!(!acme_hits.is_empty());
        assert!(!globex_hits.is_empty());

        let acme_stats = store.stats("acme").await.unwrap();
        let globex_stats = store.stats("globex").await.unwrap();
        assert_eq!(acme_stats.episodes, 1);
        assert_eq!(globex_stats.episodes, 1);
    }

    #[tokio::test]
    async fn shortest_path_finds_connected_entities() {
        let store = InMemoryGraphStore::new();
        store
            .add_episode(episode("acme", "Rust calls Tokio which calls Mio"))
            .await
            .unwrap();

        let paths = store.shortest_path("acme", "Rust", "Mio", 5).await.unwrap();
        assert!(!paths.is_empty());
    }

    #[tokio::test]
    async fn delete_tenant_removes_all_rows_and_leaves_other_tenants() {
        let store = InMemoryGraphStore::new();
        store
            .add_episode(episode("acme", "Rust and Tokio power this service"))
            .await
            .unwrap();
        store
            .add_episode(episode("globex", "Rust is also used at Globex"))
            .await
            .unwrap();

        let removed = store.delete_tenant("acme").await.unwrap();
        assert!(removed > 0);
        let acme_stats = store.stats("acme").await.unwrap();
        assert_eq!(acme_stats.entities, 0);
        let globex_stats = store.stats("globex").await.unwrap();
        assert!(globex_stats.entities > 0);
    }

    #[tokio::test]
    async fn shortest_path_returns_empty_for_unknown_entities() {
        let store = InMemoryGraphStore::new();
        let paths = store
            .shortest_path("acme", "Nonexistent", "AlsoMissing", 5)
            .await
            .unwrap();
        assert!(paths.is_empty());
    }
}
