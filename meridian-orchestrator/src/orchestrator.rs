// ABOUTME: RetrievalOrchestrator: single query() operation tying tenant resolution, fan-out, and synthesis together

use std::sync::Arc;
use std::time::Instant;

use meridian_ess::EssAdapter;
use meridian_graph::GraphStore;
use meridian_providers::EmbeddingProvider;
use meridian_rag::VectorStorage;
use meridian_tenancy::TenantRegistry;

use crate::error::{OrchestratorError, Result};
use crate::fanout::fan_out;
use crate::flags::QueryFlags;
use crate::synthesis::synthesize;
use crate::types::SynthesizedAnswer;

pub struct RetrievalOrchestrator {
    tenants: Arc<TenantRegistry>,
    vector_store: Arc<dyn VectorStorage>,
    graph_store: Arc<dyn GraphStore>,
    embedder: Arc<dyn EmbeddingProvider>,
    ess: Option<Arc<EssAdapter>>,
}

impl std::fmt::Debug for RetrievalOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetrievalOrchestrator")
            .field("ess_enabled", &self.ess.is_some())
            .finish_non_exhaustive()
    }
}

impl RetrievalOrchestrator {
    #[must_use]
    pub fn new(
        tenants: Arc<TenantRegistry>,
        vector_store: Arc<dyn VectorStorage>,
        graph_store: Arc<dyn GraphStore>,
        embedder: Arc<dyn EmbeddingProvider>,
        ess: Option<Arc<EssAdapter>>,
    ) -> Self {
        Self {
            tenants,
            vector_store,
            graph_store,
            embedder,
            ess,
        }
    }

    /// # Errors
    /// Returns an error only when the tenant cannot be resolved as active
    /// or the query embedding call itself fails; every backend failure
    /// downstream of that is absorbed into the synthesized answer.
    pub async fn query(&self, tenant_id: &str, text: &str, flags: &QueryFlags) -> Result<SynthesizedAnswer> {
        let start = Instant::now();

        self.tenants
            .require_active(tenant_id)
            .await
            .map_err(|_| OrchestratorError::TenantUnavailable(tenant_id.to_string()))?;

        let query_vec = self
            .embedder
            .embed(&[text.to_string()])
            .await
            .map_err(|e| OrchestratorError::Embedding(e.to_string()))?
            .into_iter()
            .next()
            .ok_or_else(|| OrchestratorError::Embedding("embedder returned no vector".to_string()))?;

        let (vector, graph, ess) = fan_out(
            &self.vector_store,
            &self.graph_store,
            self.ess.as_ref(),
            tenant_id,
            text,
            &query_vec.0,
            flags,
        )
        .await;

        let mut answer = synthesize(&vector, &graph, &ess);
        answer.timings.total = start.elapsed();
        Ok(answer)
    }
}
