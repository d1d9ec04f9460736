// ABOUTME: Wires every backend handle into one AppState, sled-backed and in-process
// ABOUTME: Vector/graph adapters are the in-memory reference implementations; no external DSN/URI is dialed

use std::path::PathBuf;
use std::sync::Arc;

use meridian_agents::{build_default_registry, AgentRuntime, AgentRuntimeConfig};
use meridian_config::MeridianConfig;
use meridian_ess::EssAdapter;
use meridian_graph::{GraphStore, InMemoryGraphStore};
use meridian_ingestion::{IngestionConfig, IngestionCoordinator};
use meridian_orchestrator::RetrievalOrchestrator;
use meridian_providers::{EmbeddingProvider, HttpEmbeddingProvider, HttpLlmClient, LlmClient};
use meridian_rag::{InMemoryVectorStore, VectorStorage};
use meridian_security::{AuditLogger, AuthGate};
use meridian_storage::SledBackend;
use meridian_tenancy::TenantRegistry;
use meridian_web::{AppState, WebConfig};

use crate::error::CliError;

const EMBEDDER_TIMEOUT_SECS: u64 = 30;
const LLM_TIMEOUT_SECS: u64 = 60;

/// Builds the full `AppState` the request API serves. Vector and graph
/// storage always use their in-process reference implementations
/// (`VECTOR_DSN`/`GRAPH_URI` select nothing else yet); ESS is wired only
/// when `ESS_BASE_URL` is set.
///
/// # Errors
/// Returns `CliError::Init` if the embedded database cannot be opened.
pub fn build_app_state(config: &MeridianConfig, data_dir: PathBuf) -> Result<AppState, CliError> {
    let backend = SledBackend::open(data_dir).map_err(|e| CliError::Init(e.to_string()))?;

    let tenants = Arc::new(TenantRegistry::new(backend.clone()));
    let auth = Arc::new(AuthGate::new(&config.auth, backend.clone(), AuditLogger::new()));

    let vector_store: Arc<dyn VectorStorage> = Arc::new(InMemoryVectorStore::new());
    let graph_store: Arc<dyn GraphStore> = Arc::new(InMemoryGraphStore::new());

    let embedder: Arc<dyn EmbeddingProvider> = Arc::new(HttpEmbeddingProvider::new(
        config.providers.embedding_base_url.clone(),
        config.providers.embed_model.clone(),
        config.providers.embed_dim,
        EMBEDDER_TIMEOUT_SECS,
    ));
    let llm: Arc<dyn LlmClient> = Arc::new(HttpLlmClient::new(
        config.providers.llm_base_url.clone(),
        config.providers.llm_model.clone(),
        LLM_TIMEOUT_SECS,
    ));

    let ess = if config.ess.base_url.is_empty() {
        None
    } else {
        Some(Arc::new(EssAdapter::new(&config.ess, backend)))
    };

    let orchestrator = Arc::new(RetrievalOrchestrator::new(
        tenants.clone(),
        vector_store.clone(),
        graph_store.clone(),
        embedder.clone(),
        ess.clone(),
    ));

    let registry = Arc::new(build_default_registry(
        vector_store.clone(),
        graph_store.clone(),
        embedder.clone(),
        orchestrator.clone(),
        ess.clone(),
    ));
    let agents = Arc::new(AgentRuntime::new(registry, llm, AgentRuntimeConfig::default()));

    let ingestion_config = IngestionConfig {
        ess_enabled: ess.is_some(),
        ..IngestionConfig::default()
    };
    let ingestion = Arc::new(IngestionCoordinator::new(
        tenants.clone(),
        vector_store.clone(),
        graph_store.clone(),
        embedder,
        ess.clone(),
        ingestion_config,
    ));

    Ok(AppState {
        tenants,
        auth,
        orchestrator,
        agents,
        ingestion,
        vector_store,
        graph_store,
        ess,
        config: WebConfig::from_server_config(&config.server),
    })
}
