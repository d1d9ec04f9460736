// ABOUTME: Bi-temporal graph types
// ABOUTME: Every type here carries tenant_id so adapters can filter without a separate scoping layer

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Entity {
    pub id: String,
    pub tenant_id: String,
    pub name: String,
    pub entity_type: String,
    pub properties: Value,
    pub event_time: Option<DateTime<Utc>>,
    pub ingestion_time: DateTime<Utc>,
}

impl Entity {
    #[must_use]
    pub fn new(tenant_id: impl Into<String>, name: impl Into<String>, entity_type: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            tenant_id: tenant_id.into(),
            name: name.into(),
            entity_type: entity_type.into(),
            properties: Value::Null,
            event_time: None,
            ingestion_time: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeDirection {
    In,
    Out,
    Both,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Relationship {
    pub id: String,
    pub tenant_id: String,
    pub from_entity: String,
    pub to_entity: String,
    pub relationship_type: String,
    pub properties: Value,
    pub event_time: Option<DateTime<Utc>>,
    pub ingestion_time: DateTime<Utc>,
}

impl Relationship {
    #[must_use]
    pub fn new(
        tenant_id: impl Into<String>,
        from_entity: impl Into<String>,
        to_entity: impl Into<String>,
        relationship_type: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            tenant_id: tenant_id.into(),
            from_entity: from_entity.into(),
            to_entity: to_entity.into(),
            relationship_type: relationship_type.into(),
            properties: Value::Null,
            event_time: None,
            ingestion_time: Utc::now(),
        }
    }
}

/// A Fact references a set of entities with a validity interval, distinct
/// from an Entity: it is a first-class node kind in the bi-temporal model,
/// not just an edge annotation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Fact {
    pub id: String,
    pub tenant_id: String,
    pub statement: String,
    pub entity_ids: Vec<String>,
    pub valid_at: DateTime<Utc>,
    pub invalid_at: Option<DateTime<Utc>>,
    pub ingestion_time: DateTime<Utc>,
}

impl Fact {
    #[must_use]
    pub fn new(tenant_id: impl Into<String>, statement: impl Into<String>, entity_ids: Vec<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            tenant_id: tenant_id.into(),
            statement: statement.into(),
            entity_ids,
            valid_at: Utc::now(),
            invalid_at: None,
            ingestion_time: Utc::now(),
        }
    }

    #[must_use]
    pub fn is_current(&self) -> bool {
        self.invalid_at.map_or(true, |t| t > Utc::now())
    }
}

/// Unit of ingestion into the graph backend. A single episode yields zero
/// or more Entities/Relationships/Facts, all tagged with the same
/// `tenant_id` in one post-write pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Episode {
    pub tenant_id: String,
    pub name: String,
    pub content: String,
    pub reference_time: DateTime<Utc>,
    pub source_description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpisodeRef {
    pub episode_id: String,
    pub entity_ids: Vec<String>,
    pub relationship_ids: Vec<String>,
    pub fact_ids: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchKind {
    Similarity,
    Entities,
    Facts,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SearchHit {
    Entity(Entity),
    Fact(Fact),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    pub relationship: Relationship,
    pub other_entity_id: String,
    pub direction: EdgeDirection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactEvent {
    pub fact: Fact,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Path {
    pub entity_ids: Vec<String>,
    pub relationship_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphStats {
    pub entities: usize,
    pub relationships: usize,
    pub facts: usize,
    pub episodes: usize,
    pub by_entity_type: std::collections::HashMap<String, usize>,
}
