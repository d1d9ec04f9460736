// ABOUTME: Agent runtime: fixed tool registry as data, tool-call loop against an LLM collaborator
// ABOUTME: Tools never accept tenant_id; the runtime substitutes it from the caller's AuthContext

#![warn(missing_debug_implementations)]

use std::sync::Arc;

use meridian_ess::EssAdapter;
use meridian_graph::GraphStore;
use meridian_orchestrator::RetrievalOrchestrator;
use meridian_providers::EmbeddingProvider;
use meridian_rag::VectorStorage;

mod builtins;
mod error;
mod registry;
mod runtime;
mod tool;

pub use builtins::{
    ComprehensiveSearchTool, EntityRelationshipsTool, EntityTimelineTool, GraphSearchTool, HybridSearchTool,
    OnyxAnswerWithQuoteTool, OnyxSearchTool, VectorSearchTool,
};
pub use error::{AgentError, Result};
pub use registry::ToolRegistry;
pub use runtime::{AgentRuntime, AgentRuntimeConfig, AgentTurn, ToolCallRecord, DEFAULT_STEP_BUDGET};
pub use tool::{Tool, ToolDescriptor};

/// System prompt describing tool-selection heuristics: favor the narrowest
/// tool that can answer the question, escalate to `comprehensive_search`
/// only when the narrower ones come up empty.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a retrieval assistant scoped to one tenant's data. \
Prefer the narrowest tool that can answer the question: use vector_search or graph_search for \
direct lookups, hybrid_search when an answer needs both, comprehensive_search only when those are \
insufficient and an external document set is available, and entity_relationships/entity_timeline \
when the user asks about a specific known entity. Only use onyx_search or onyx_answer_with_quote \
when the user explicitly asks about externally connected enterprise content. Never fabricate a \
citation; if no tool call finds an answer, say so.";

/// Wires the fixed tool registry against the backends a deployment already
/// constructed for ingestion and retrieval. `ess` is
/// `None` when the tenant workspace has no enterprise search service
/// binding configured, in which case `onyx_search`/`onyx_answer_with_quote`
/// are omitted from the registry entirely.
#[must_use]
pub fn build_default_registry(
    vector_store: Arc<dyn VectorStorage>,
    graph_store: Arc<dyn GraphStore>,
    embedder: Arc<dyn EmbeddingProvider>,
    orchestrator: Arc<RetrievalOrchestrator>,
    ess: Option<Arc<EssAdapter>>,
) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(VectorSearchTool::new(vector_store, embedder)));
    registry.register(Arc::new(GraphSearchTool::new(graph_store.clone())));
    registry.register(Arc::new(HybridSearchTool::new(orchestrator.clone())));
    registry.register(Arc::new(ComprehensiveSearchTool::new(orchestrator)));
    registry.register(Arc::new(EntityRelationshipsTool::new(graph_store.clone())));
    registry.register(Arc::new(EntityTimelineTool::new(graph_store)));
    if let Some(ess) = ess {
        registry.register(Arc::new(OnyxSearchTool::new(ess.clone())));
        registry.register(Arc::new(OnyxAnswerWithQuoteTool::new(ess)));
    }
    registry
}

pub mod prelude {
    pub use crate::{build_default_registry, AgentRuntime, AgentRuntimeConfig, AgentTurn, Tool, ToolRegistry, DEFAULT_SYSTEM_PROMPT};
}
