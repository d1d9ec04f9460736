// ABOUTME: WebServer::build_app wires every route plus CORS/trace middleware onto one Router
// ABOUTME: A unit struct, not a running server; the caller owns the listener and the serve() call

use axum::http::HeaderValue;
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::routes::{chat, documents, health, tenants};
use crate::state::AppState;

pub struct WebServer;

impl WebServer {
    #[must_use]
    pub fn build_app(state: AppState) -> Router {
        let cors = Self::cors_layer(&state);

        Router::new()
            .route("/health", get(health::health))
            .route("/chat", post(chat::chat))
            .route("/chat/stream", post(chat::chat_stream))
            .route("/tenants", post(tenants::create_tenant).get(tenants::list_tenants))
            .route(
                "/tenants/:id",
                get(tenants::get_tenant)
                    .patch(tenants::update_tenant_status)
                    .delete(tenants::delete_tenant),
            )
            .route("/documents", post(documents::ingest_document))
            .route("/documents/stats", get(documents::document_stats))
            .route("/documents/:document_id", delete(documents::delete_document))
            .layer(cors)
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }

    fn cors_layer(state: &AppState) -> CorsLayer {
        if state.config.cors_allowed_origins.is_empty() {
            return CorsLayer::permissive();
        }
        let origins: Vec<HeaderValue> = state
            .config
            .cors_allowed_origins
            .iter()
            .filter_map(|o| HeaderValue::from_str(o).ok())
            .collect();
        CorsLayer::new().allow_origin(AllowOrigin::list(origins))
    }
}

impl std::fmt::Debug for WebServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebServer").finish()
    }
}
