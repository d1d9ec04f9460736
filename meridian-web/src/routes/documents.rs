// ABOUTME: Document ingest/delete/stats mirroring meridian-ingestion::IngestionCoordinator
// ABOUTME: Ingest takes a JSON envelope rather than multipart; axum's multipart feature is not in the dependency stack

use axum::extract::{Path, State};
use axum::Json;
use meridian_ingestion::IngestionResult;
use meridian_rag::VectorStoreStats;
use serde::Deserialize;

use crate::auth::{require_permission, Authenticated};
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct IngestRequest {
    pub filename: String,
    pub content: String,
}

pub async fn ingest_document(
    State(state): State<AppState>,
    Authenticated(ctx): Authenticated,
    Json(req): Json<IngestRequest>,
) -> Result<Json<IngestionResult>, ApiError> {
    require_permission(&ctx, "documents:write")?;
    let result = state
        .ingestion
        .ingest(&ctx.tenant_id, &req.filename, &req.content)
        .await?;
    Ok(Json(result))
}

pub async fn delete_document(
    State(state): State<AppState>,
    Authenticated(ctx): Authenticated,
    Path(document_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    require_permission(&ctx, "documents:delete")?;
    let removed = state
        .vector_store
        .delete_document(&ctx.tenant_id, &document_id)
        .await?;
    Ok(Json(serde_json::json!({ "chunks_removed": removed })))
}

pub async fn document_stats(
    State(state): State<AppState>,
    Authenticated(ctx): Authenticated,
) -> Result<Json<VectorStoreStats>, ApiError> {
    require_permission(&ctx, "documents:read")?;
    let stats = state.vector_store.stats(&ctx.tenant_id).await?;
    Ok(Json(stats))
}
