// ABOUTME: AppState: the handles every route handler needs, threaded through axum's Router state
// ABOUTME: Clone is cheap: every field is an Arc or a small Clone value

use std::sync::Arc;

use meridian_agents::AgentRuntime;
use meridian_ess::EssAdapter;
use meridian_graph::GraphStore;
use meridian_ingestion::IngestionCoordinator;
use meridian_orchestrator::RetrievalOrchestrator;
use meridian_rag::VectorStorage;
use meridian_security::AuthGate;
use meridian_tenancy::TenantRegistry;

use crate::config::WebConfig;

/// Cloned per request by axum; every field is either an `Arc` or `Copy`,
/// so cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    pub tenants: Arc<TenantRegistry>,
    pub auth: Arc<AuthGate>,
    pub orchestrator: Arc<RetrievalOrchestrator>,
    pub agents: Arc<AgentRuntime>,
    pub ingestion: Arc<IngestionCoordinator>,
    pub vector_store: Arc<dyn VectorStorage>,
    pub graph_store: Arc<dyn GraphStore>,
    pub ess: Option<Arc<EssAdapter>>,
    pub config: WebConfig,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
