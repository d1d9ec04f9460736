// ABOUTME: End-to-end route tests over an all-in-memory AppState
// ABOUTME: Drives the router directly with tower::ServiceExt::oneshot, no real socket involved

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use meridian_agents::{build_default_registry, AgentRuntime, AgentRuntimeConfig};
use meridian_config::AuthConfig;
use meridian_core::types::Embedding;
use meridian_graph::InMemoryGraphStore;
use meridian_ingestion::{IngestionConfig, IngestionCoordinator};
use meridian_orchestrator::RetrievalOrchestrator;
use meridian_providers::{ChatRequest, ChatResponse, EmbeddingProvider, LlmClient};
use meridian_rag::InMemoryVectorStore;
use meridian_security::{AuditLogger, AuthGate};
use meridian_storage::SledBackend;
use meridian_tenancy::{TenantQuotas, TenantRegistry};
use meridian_web::{AppState, WebConfig, WebServer};
use tower::ServiceExt;

#[derive(Debug)]
struct FakeEmbedder;

#[async_trait]
impl EmbeddingProvider for FakeEmbedder {
    async fn embed(&self, texts: &[String]) -> meridian_providers::Result<Vec<Embedding>> {
        Ok(texts.iter().map(|_| Embedding(vec![0.1; 4])).collect())
    }

    fn dimension(&self) -> usize {
        4
    }
}

#[derive(Debug)]
struct FakeLlm;

#[async_trait]
impl LlmClient for FakeLlm {
    async fn chat(&self, _request: ChatRequest) -> meridian_providers::Result<ChatResponse> {
        Ok(ChatResponse::Message("no relevant documents found".to_string()))
    }
}

async fn test_app() -> (axum::Router, String) {
    let backend = SledBackend::temporary().unwrap();
    let tenants = Arc::new(TenantRegistry::new(backend.clone()));
    tenants
        .create("acme", "Acme Corp", TenantQuotas::default(), Default::default())
        .await
        .unwrap();

    let auth = Arc::new(AuthGate::new(&AuthConfig::default(), backend, AuditLogger::new()));
    let pair = auth
        .issue(
            "acme",
            "alice",
            vec!["admin".to_string()],
            false,
        )
        .await
        .unwrap();

    let vector_store: Arc<dyn meridian_rag::VectorStorage> = Arc::new(InMemoryVectorStore::new());
    let graph_store: Arc<dyn meridian_graph::GraphStore> = Arc::new(InMemoryGraphStore::new());
    let embedder: Arc<dyn EmbeddingProvider> = Arc::new(FakeEmbedder);
    let llm: Arc<dyn LlmClient> = Arc::new(FakeLlm);

    let orchestrator = Arc::new(RetrievalOrchestrator::new(
        tenants.clone(),
        vector_store.clone(),
        graph_store.clone(),
        embedder.clone(),
        None,
    ));

    let registry = Arc::new(build_default_registry(
        vector_store.clone(),
        graph_store.clone(),
        embedder.clone(),
        orchestrator.clone(),
        None,
    ));
    let agents = Arc::new(AgentRuntime::new(registry, llm, AgentRuntimeConfig::default()));

    let ingestion = Arc::new(IngestionCoordinator::new(
        tenants.clone(),
        vector_store.clone(),
        graph_store.clone(),
        embedder,
        None,
        IngestionConfig::default(),
    ));

    let state = AppState {
        tenants,
        auth,
        orchestrator,
        agents,
        ingestion,
        vector_store,
        graph_store,
        ess: None,
        config: WebConfig::default(),
    };

    (WebServer::build_app(state), pair.access_token)
}

#[tokio::test]
async fn health_requires_no_auth() {
    let (app, _token) = test_app().await;
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn chat_without_token_is_unauthorized() {
    let (app, _token) = test_app().await;
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/chat")
                .header("Content-Type", "application/json")
                .body(Body::from(r#"{"query":"what do we know about acme?"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn chat_with_valid_token_runs_the_agent_loop() {
    let (app, token) = test_app().await;
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/chat")
                .header("Content-Type", "application/json")
                .header("Authorization", format!("Bearer {token}"))
                .body(Body::from(r#"{"query":"what do we know about acme?"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let turn: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(turn["text"], "no relevant documents found");
}

#[tokio::test]
async fn ingest_then_stats_reflects_the_new_document() {
    let (app, token) = test_app().await;
    let ingest_response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/documents")
                .header("Content-Type", "application/json")
                .header("Authorization", format!("Bearer {token}"))
                .body(Body::from(
                    serde_json::json!({
                        "filename": "notes.md",
                        "content": "# Acme Runbook\n\nAcme Corp uses meridian for retrieval.",
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(ingest_response.status(), StatusCode::OK);

    let stats_response = app
        .oneshot(
            Request::builder()
                .uri("/documents/stats")
                .header("Authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(stats_response.status(), StatusCode::OK);
    let body = stats_response.into_body().collect().await.unwrap().to_bytes();
    let stats: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(stats["documents"], 1);
}

#[tokio::test]
async fn tenant_crud_round_trips() {
    let (app, token) = test_app().await;
    let create_response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/tenants")
                .header("Content-Type", "application/json")
                .header("Authorization", format!("Bearer {token}"))
                .body(Body::from(
                    serde_json::json!({"id": "globex", "name": "Globex"}).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(create_response.status(), StatusCode::OK);

    let get_response = app
        .oneshot(
            Request::builder()
                .uri("/tenants/globex")
                .header("Authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(get_response.status(), StatusCode::OK);
}
