// ABOUTME: Concurrent fan-out to vector/graph/ESS backends, each under an independent deadline
// ABOUTME: A backend exceeding its deadline is dropped, not failed, so one slow store can't sink the whole query

use std::sync::Arc;
use std::time::{Duration, Instant};

use meridian_graph::{Edge, EdgeDirection, GraphStore, SearchHit, SearchKind};
use meridian_rag::{Hit, VectorStorage};

use crate::flags::QueryFlags;

#[derive(Debug, Clone, Default)]
pub struct VectorResults {
    pub hits: Vec<Hit>,
    pub elapsed: Option<Duration>,
}

#[derive(Debug, Clone, Default)]
pub struct GraphResults {
    pub hits: Vec<SearchHit>,
    pub top_entity_relationships: Vec<Edge>,
    pub elapsed: Option<Duration>,
}

#[derive(Debug, Clone, Default)]
pub struct EssResults {
    pub answer: Option<String>,
    pub source_titles: Vec<String>,
    pub degraded: bool,
    pub elapsed: Option<Duration>,
}

pub async fn fan_out(
    vector_store: &Arc<dyn VectorStorage>,
    graph_store: &Arc<dyn GraphStore>,
    ess: Option<&Arc<meridian_ess::EssAdapter>>,
    tenant_id: &str,
    query_text: &str,
    query_vec: &[f32],
    flags: &QueryFlags,
) -> (VectorResults, GraphResults, EssResults) {
    let (vector, graph, ess) = tokio::join!(
        run_vector(vector_store, tenant_id, query_text, query_vec, flags),
        run_graph(graph_store, tenant_id, query_text, flags),
        run_ess(ess, tenant_id, query_text, flags),
    );
    (vector, graph, ess)
}

async fn run_vector(
    store: &Arc<dyn VectorStorage>,
    tenant_id: &str,
    query_text: &str,
    query_vec: &[f32],
    flags: &QueryFlags,
) -> VectorResults {
    if !flags.vector_enabled {
        return VectorResults::default();
    }
    let start = Instant::now();
    let call = store.hybrid_search(tenant_id, query_vec, query_text, flags.top_k, flags.vector_threshold, flags.vector_weight);
    match tokio::time::timeout(flags.backend_deadline, call).await {
        Ok(Ok(hits)) => VectorResults {
            hits,
            elapsed: Some(start.elapsed()),
        },
        Ok(Err(e)) => {
            tracing::warn!(tenant_id, error = %e, "vector search failed");
            VectorResults::default()
        }
        Err(_) => {
            tracing::warn!(tenant_id, "vector search exceeded deadline");
            VectorResults::default()
        }
    }
}

async fn run_graph(store: &Arc<dyn GraphStore>, tenant_id: &str, query_text: &str, flags: &QueryFlags) -> GraphResults {
    if !flags.graph_enabled {
        return GraphResults::default();
    }
    let start = Instant::now();
    let call = store.search(tenant_id, query_text, SearchKind::Similarity, flags.top_k);
    let hits = match tokio::time::timeout(flags.backend_deadline, call).await {
        Ok(Ok(hits)) => hits,
        Ok(Err(e)) => {
            tracing::warn!(tenant_id, error = %e, "graph search failed");
            return GraphResults::default();
        }
        Err(_) => {
            tracing::warn!(tenant_id, "graph search exceeded deadline");
            return GraphResults::default();
        }
    };

    let top_entity_id = hits.iter().find_map(|h| match h {
        SearchHit::Entity(e) => Some(e.id.clone()),
        SearchHit::Fact(_) => None,
    });

    let top_entity_relationships = if let Some(entity_id) = top_entity_id {
        let rel_call = store.entity_relationships(tenant_id, &entity_id, EdgeDirection::Both, None, 3);
        tokio::time::timeout(flags.backend_deadline, rel_call)
            .await
            .ok()
            .and_then(std::result::Result::ok)
            .unwrap_or_default()
    } else {
        Vec::new()
    };

    GraphResults {
        hits,
        top_entity_relationships,
        elapsed: Some(start.elapsed()),
    }
}

async fn run_ess(
    ess: Option<&Arc<meridian_ess::EssAdapter>>,
    tenant_id: &str,
    query_text: &str,
    flags: &QueryFlags,
) -> EssResults {
    if !flags.ess_enabled {
        return EssResults::default();
    }
    let Some(ess) = ess else {
        return EssResults::default();
    };
    let Some(document_set_id) = &flags.ess_document_set_id else {
        return EssResults::default();
    };

    let start = Instant::now();
    let call = ess.search(query_text, document_set_id, flags.ess_persona_id);
    let outcome = match tokio::time::timeout(flags.backend_deadline, call).await {
        Ok(outcome) => outcome,
        Err(_) => {
            tracing::warn!(tenant_id, "ess search exceeded deadline");
            return EssResults {
                elapsed: Some(start.elapsed()),
                ..EssResults::default()
            };
        }
    };

    match outcome {
        meridian_ess::SearchOutcome::Success { answer, source_docs, .. } => EssResults {
            answer: Some(answer),
            source_titles: source_docs.into_iter().map(|d| d.title).collect(),
            degraded: false,
            elapsed: Some(start.elapsed()),
        },
        meridian_ess::SearchOutcome::Failure { error } => {
            tracing::info!(tenant_id, error, "ess targeted search empty, falling back to simple chat");
            match ess.simple_chat(query_text, flags.ess_persona_id).await {
                Ok(answer) if !answer.trim().is_empty() => EssResults {
                    answer: Some(answer),
                    source_titles: Vec::new(),
                    degraded: true,
                    elapsed: Some(start.elapsed()),
                },
                _ => EssResults {
                    elapsed: Some(start.elapsed()),
                    ..EssResults::default()
                },
            }
        }
    }
}
