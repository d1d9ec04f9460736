// ABOUTME: The fixed tool registry's concrete implementations
// ABOUTME: Each tool is grounded on the backend it wraps; none accept tenant_id as an argument

use std::sync::Arc;

use async_trait::async_trait;
use meridian_ess::EssAdapter;
use meridian_graph::{EdgeDirection, GraphStore, SearchKind};
use meridian_orchestrator::{QueryFlags, RetrievalOrchestrator};
use meridian_providers::EmbeddingProvider;
use meridian_rag::VectorStorage;
use meridian_security::AuthContext;
use serde_json::{json, Value};

use crate::error::{AgentError, Result};
use crate::tool::{Tool, ToolDescriptor};

fn arg_str<'a>(args: &'a Value, tool: &'static str, field: &str) -> Result<&'a str> {
    args.get(field)
        .and_then(Value::as_str)
        .ok_or_else(|| AgentError::InvalidArguments {
            tool: tool.to_string(),
            message: format!("missing required string field `{field}`"),
        })
}

fn arg_usize(args: &Value, field: &str, default: usize) -> usize {
    args.get(field).and_then(Value::as_u64).map_or(default, |n| n as usize)
}

fn arg_f32(args: &Value, field: &str, default: f32) -> f32 {
    args.get(field).and_then(Value::as_f64).map_or(default, |n| n as f32)
}

/// Direct vector k-NN lookup, bypassing the orchestrator's fan-out and synthesis.
pub struct VectorSearchTool {
    descriptor: ToolDescriptor,
    vector_store: Arc<dyn VectorStorage>,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl VectorSearchTool {
    #[must_use]
    pub fn new(vector_store: Arc<dyn VectorStorage>, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            descriptor: ToolDescriptor {
                name: "vector_search",
                description: "Pure vector k-NN search over the tenant's ingested documents.",
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "query": {"type": "string"},
                        "top_k": {"type": "integer", "minimum": 1},
                        "threshold": {"type": "number"}
                    },
                    "required": ["query"]
                }),
            },
            vector_store,
            embedder,
        }
    }
}

impl std::fmt::Debug for VectorSearchTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VectorSearchTool").field("descriptor", &self.descriptor).finish_non_exhaustive()
    }
}

#[async_trait]
impl Tool for VectorSearchTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn call(&self, args: Value, auth: &AuthContext) -> Result<Value> {
        let query = arg_str(&args, "vector_search", "query")?;
        let top_k = arg_usize(&args, "top_k", 5);
        let threshold = arg_f32(&args, "threshold", 0.5);

        let query_vec = self
            .embedder
            .embed(&[query.to_string()])
            .await
            .map_err(|e| AgentError::Llm(e.to_string()))?
            .into_iter()
            .next()
            .ok_or_else(|| AgentError::Llm("embedder returned no vector".to_string()))?;

        let hits = self
            .vector_store
            .vector_search(&auth.tenant_id, &query_vec.0, top_k, threshold)
            .await
            .map_err(|e| AgentError::Llm(e.to_string()))?;

        Ok(json!({ "hits": hits }))
    }
}

/// Direct knowledge-graph search: similarity over entities/facts, or a typed lookup.
pub struct GraphSearchTool {
    descriptor: ToolDescriptor,
    graph_store: Arc<dyn GraphStore>,
}

impl GraphSearchTool {
    #[must_use]
    pub fn new(graph_store: Arc<dyn GraphStore>) -> Self {
        Self {
            descriptor: ToolDescriptor {
                name: "graph_search",
                description: "Search the tenant's knowledge graph for matching entities or facts.",
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "query": {"type": "string"},
                        "kind": {"type": "string", "enum": ["similarity", "entities", "facts"]},
                        "limit": {"type": "integer", "minimum": 1}
                    },
                    "required": ["query"]
                }),
            },
            graph_store,
        }
    }
}

impl std::fmt::Debug for GraphSearchTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphSearchTool").field("descriptor", &self.descriptor).finish_non_exhaustive()
    }
}

#[async_trait]
impl Tool for GraphSearchTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn call(&self, args: Value, auth: &AuthContext) -> Result<Value> {
        let query = arg_str(&args, "graph_search", "query")?;
        let limit = arg_usize(&args, "limit", 10);
        let kind = match args.get("kind").and_then(Value::as_str) {
            Some("entities") => SearchKind::Entities,
            Some("facts") => SearchKind::Facts,
            _ => SearchKind::Similarity,
        };

        let hits = self
            .graph_store
            .search(&auth.tenant_id, query, kind, limit)
            .await
            .map_err(|e| AgentError::Llm(e.to_string()))?;

        Ok(json!({ "hits": hits }))
    }
}

/// Orchestrated vector+graph retrieval with ESS disabled, passed straight through to the orchestrator.
pub struct HybridSearchTool {
    descriptor: ToolDescriptor,
    orchestrator: Arc<RetrievalOrchestrator>,
}

impl HybridSearchTool {
    #[must_use]
    pub fn new(orchestrator: Arc<RetrievalOrchestrator>) -> Self {
        Self {
            descriptor: ToolDescriptor {
                name: "hybrid_search",
                description: "Combined vector and knowledge-graph retrieval with a synthesized, cited answer. Never calls the external enterprise search service.",
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "query": {"type": "string"},
                        "top_k": {"type": "integer", "minimum": 1}
                    },
                    "required": ["query"]
                }),
            },
            orchestrator,
        }
    }
}

impl std::fmt::Debug for HybridSearchTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HybridSearchTool").field("descriptor", &self.descriptor).finish_non_exhaustive()
    }
}

#[async_trait]
impl Tool for HybridSearchTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn call(&self, args: Value, auth: &AuthContext) -> Result<Value> {
        let query = arg_str(&args, "hybrid_search", "query")?;
        let mut flags = QueryFlags {
            ess_enabled: false,
            ..QueryFlags::default()
        };
        flags.top_k = arg_usize(&args, "top_k", flags.top_k);

        let answer = self
            .orchestrator
            .query(&auth.tenant_id, query, &flags)
            .await
            .map_err(|e| AgentError::Llm(e.to_string()))?;

        serde_json::to_value(answer).map_err(|e| AgentError::Llm(e.to_string()))
    }
}

/// Full orchestrated retrieval, including the external enterprise search service
/// when the caller names a document set to search against.
pub struct ComprehensiveSearchTool {
    descriptor: ToolDescriptor,
    orchestrator: Arc<RetrievalOrchestrator>,
}

impl ComprehensiveSearchTool {
    #[must_use]
    pub fn new(orchestrator: Arc<RetrievalOrchestrator>) -> Self {
        Self {
            descriptor: ToolDescriptor {
                name: "comprehensive_search",
                description: "Full retrieval across vector, knowledge-graph, and (when a document set is bound) the external enterprise search service.",
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "query": {"type": "string"},
                        "top_k": {"type": "integer", "minimum": 1},
                        "ess_document_set_id": {"type": "string"}
                    },
                    "required": ["query"]
                }),
            },
            orchestrator,
        }
    }
}

impl std::fmt::Debug for ComprehensiveSearchTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComprehensiveSearchTool").field("descriptor", &self.descriptor).finish_non_exhaustive()
    }
}

#[async_trait]
impl Tool for ComprehensiveSearchTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn call(&self, args: Value, auth: &AuthContext) -> Result<Value> {
        let query = arg_str(&args, "comprehensive_search", "query")?;
        let ess_document_set_id = args.get("ess_document_set_id").and_then(Value::as_str).map(str::to_string);
        let mut flags = QueryFlags {
            ess_enabled: ess_document_set_id.is_some(),
            ess_document_set_id,
            ..QueryFlags::default()
        };
        flags.top_k = arg_usize(&args, "top_k", flags.top_k);

        let answer = self
            .orchestrator
            .query(&auth.tenant_id, query, &flags)
            .await
            .map_err(|e| AgentError::Llm(e.to_string()))?;

        serde_json::to_value(answer).map_err(|e| AgentError::Llm(e.to_string()))
    }
}

/// Direct relationship lookup for a single entity.
pub struct EntityRelationshipsTool {
    descriptor: ToolDescriptor,
    graph_store: Arc<dyn GraphStore>,
}

impl EntityRelationshipsTool {
    #[must_use]
    pub fn new(graph_store: Arc<dyn GraphStore>) -> Self {
        Self {
            descriptor: ToolDescriptor {
                name: "entity_relationships",
                description: "List relationships attached to a known entity, optionally filtered by direction and relationship type.",
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "entity_id": {"type": "string"},
                        "direction": {"type": "string", "enum": ["in", "out", "both"]},
                        "types": {"type": "array", "items": {"type": "string"}},
                        "limit": {"type": "integer", "minimum": 1}
                    },
                    "required": ["entity_id"]
                }),
            },
            graph_store,
        }
    }
}

impl std::fmt::Debug for EntityRelationshipsTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityRelationshipsTool").field("descriptor", &self.descriptor).finish_non_exhaustive()
    }
}

#[async_trait]
impl Tool for EntityRelationshipsTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn call(&self, args: Value, auth: &AuthContext) -> Result<Value> {
        let entity_id = arg_str(&args, "entity_relationships", "entity_id")?;
        let limit = arg_usize(&args, "limit", 10);
        let direction = match args.get("direction").and_then(Value::as_str) {
            Some("in") => EdgeDirection::In,
            Some("out") => EdgeDirection::Out,
            _ => EdgeDirection::Both,
        };
        let types: Option<Vec<String>> = args
            .get("types")
            .and_then(Value::as_array)
            .map(|arr| arr.iter().filter_map(|v| v.as_str().map(str::to_string)).collect());

        let edges = self
            .graph_store
            .entity_relationships(&auth.tenant_id, entity_id, direction, types.as_deref(), limit)
            .await
            .map_err(|e| AgentError::Llm(e.to_string()))?;

        Ok(json!({ "edges": edges }))
    }
}

/// Chronological fact history for a single entity.
pub struct EntityTimelineTool {
    descriptor: ToolDescriptor,
    graph_store: Arc<dyn GraphStore>,
}

impl EntityTimelineTool {
    #[must_use]
    pub fn new(graph_store: Arc<dyn GraphStore>) -> Self {
        Self {
            descriptor: ToolDescriptor {
                name: "entity_timeline",
                description: "Chronological history of facts involving a known entity.",
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "entity_id": {"type": "string"},
                        "limit": {"type": "integer", "minimum": 1}
                    },
                    "required": ["entity_id"]
                }),
            },
            graph_store,
        }
    }
}

impl std::fmt::Debug for EntityTimelineTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityTimelineTool").field("descriptor", &self.descriptor).finish_non_exhaustive()
    }
}

#[async_trait]
impl Tool for EntityTimelineTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn call(&self, args: Value, auth: &AuthContext) -> Result<Value> {
        let entity_id = arg_str(&args, "entity_timeline", "entity_id")?;
        let limit = arg_usize(&args, "limit", 20);

        let events = self
            .graph_store
            .entity_timeline(&auth.tenant_id, entity_id, limit)
            .await
            .map_err(|e| AgentError::Llm(e.to_string()))?;

        Ok(json!({ "events": events }))
    }
}

/// Targeted search against a document set bound to the external enterprise search service.
pub struct OnyxSearchTool {
    descriptor: ToolDescriptor,
    ess: Arc<EssAdapter>,
}

impl OnyxSearchTool {
    #[must_use]
    pub fn new(ess: Arc<EssAdapter>) -> Self {
        Self {
            descriptor: ToolDescriptor {
                name: "onyx_search",
                description: "Targeted search against the external enterprise search service, scoped to a connector's document set.",
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "query": {"type": "string"},
                        "cc_pair_id": {"type": "integer"},
                        "persona_id": {"type": "integer"}
                    },
                    "required": ["query", "cc_pair_id"]
                }),
            },
            ess,
        }
    }
}

impl std::fmt::Debug for OnyxSearchTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnyxSearchTool").field("descriptor", &self.descriptor).finish_non_exhaustive()
    }
}

#[async_trait]
impl Tool for OnyxSearchTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn call(&self, args: Value, auth: &AuthContext) -> Result<Value> {
        let query = arg_str(&args, "onyx_search", "query")?;
        let cc_pair_id = args.get("cc_pair_id").and_then(Value::as_i64).ok_or_else(|| AgentError::InvalidArguments {
            tool: "onyx_search".to_string(),
            message: "missing required integer field `cc_pair_id`".to_string(),
        })?;
        let persona_id = args.get("persona_id").and_then(Value::as_i64);

        let document_set_id = self
            .ess
            .ensure_document_set(&auth.tenant_id, cc_pair_id)
            .await
            .map_err(|e| AgentError::Llm(e.to_string()))?;

        let outcome = self.ess.search(query, &document_set_id, persona_id).await;
        serde_json::to_value(OutcomeJson::from(outcome)).map_err(|e| AgentError::Llm(e.to_string()))
    }
}

/// Unscoped question-answering against the external enterprise search service,
/// surfacing supporting quotes the way `answer_with_quote` does in the upstream client.
pub struct OnyxAnswerWithQuoteTool {
    descriptor: ToolDescriptor,
    ess: Arc<EssAdapter>,
}

impl OnyxAnswerWithQuoteTool {
    #[must_use]
    pub fn new(ess: Arc<EssAdapter>) -> Self {
        Self {
            descriptor: ToolDescriptor {
                name: "onyx_answer_with_quote",
                description: "Ask the external enterprise search service a question across all of the tenant's connected content, returning a generated answer.",
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "query": {"type": "string"},
                        "persona_id": {"type": "integer"}
                    },
                    "required": ["query"]
                }),
            },
            ess,
        }
    }
}

impl std::fmt::Debug for OnyxAnswerWithQuoteTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnyxAnswerWithQuoteTool").field("descriptor", &self.descriptor).finish_non_exhaustive()
    }
}

#[async_trait]
impl Tool for OnyxAnswerWithQuoteTool {
    fn descriptor(&self) -> &ToolDescriptor {
        &self.descriptor
    }

    async fn call(&self, args: Value, _auth: &AuthContext) -> Result<Value> {
        let query = arg_str(&args, "onyx_answer_with_quote", "query")?;
        let persona_id = args.get("persona_id").and_then(Value::as_i64);

        let answer = self
            .ess
            .simple_chat(query, persona_id)
            .await
            .map_err(|e| AgentError::Llm(e.to_string()))?;

        Ok(json!({ "answer": answer }))
    }
}

#[derive(serde::Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum OutcomeJson {
    Success {
        answer: String,
        source_docs: Vec<meridian_ess::SourceDoc>,
        attempt: u32,
    },
    Failure {
        error: String,
    },
}

impl From<meridian_ess::SearchOutcome> for OutcomeJson {
    fn from(outcome: meridian_ess::SearchOutcome) -> Self {
        match outcome {
            meridian_ess::SearchOutcome::Success { answer, source_docs, attempt } => {
                Self::Success { answer, source_docs, attempt }
            }
            meridian_ess::SearchOutcome::Failure { error } => Self::Failure { error },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arg_str_reports_missing_field_by_tool_name() {
        let err = arg_str(&json!({}), "vector_search", "query").unwrap_err();
        match err {
            AgentError::InvalidArguments { tool, .. } => assert_eq!(tool, "vector_search"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn arg_usize_falls_back_to_default() {
        assert_eq!(arg_usize(&json!({"top_k": 3}), "top_k", 5), 3);
        assert_eq!(arg_usize(&json!({}), "top_k", 5), 5);
    }
}
