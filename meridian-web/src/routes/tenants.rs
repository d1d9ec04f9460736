// ABOUTME: Tenant admin CRUD mirroring meridian-tenancy::TenantRegistry

use std::collections::HashMap;

use axum::extract::{Path, Query, State};
use axum::Json;
use meridian_tenancy::{Tenant, TenantQuotas, TenantStatus};
use serde::Deserialize;

use crate::auth::{require_permission, Authenticated};
use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateTenantRequest {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub quotas: TenantQuotas,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

pub async fn create_tenant(
    State(state): State<AppState>,
    Authenticated(ctx): Authenticated,
    Json(req): Json<CreateTenantRequest>,
) -> Result<Json<Tenant>, ApiError> {
    require_permission(&ctx, "tenants:write")?;
    let tenant = state
        .tenants
        .create(&req.id, &req.name, req.quotas, req.metadata)
        .await?;
    Ok(Json(tenant))
}

pub async fn get_tenant(
    State(state): State<AppState>,
    Authenticated(ctx): Authenticated,
    Path(id): Path<String>,
) -> Result<Json<Tenant>, ApiError> {
    require_permission(&ctx, "tenants:read")?;
    let tenant = state
        .tenants
        .get(&id)
        .await?
        .ok_or_else(|| meridian_core::error::MeridianError::NotFound(id))?;
    Ok(Json(tenant))
}

#[derive(Debug, Deserialize)]
pub struct ListTenantsQuery {
    #[serde(default)]
    pub status: Option<TenantStatus>,
}

pub async fn list_tenants(
    State(state): State<AppState>,
    Authenticated(ctx): Authenticated,
    Query(q): Query<ListTenantsQuery>,
) -> Result<Json<Vec<Tenant>>, ApiError> {
    require_permission(&ctx, "tenants:read")?;
    let tenants = state.tenants.list(q.status).await?;
    Ok(Json(tenants))
}

#[derive(Debug, Deserialize)]
pub struct UpdateTenantStatusRequest {
    pub status: TenantStatus,
}

pub async fn update_tenant_status(
    State(state): State<AppState>,
    Authenticated(ctx): Authenticated,
    Path(id): Path<String>,
    Json(req): Json<UpdateTenantStatusRequest>,
) -> Result<Json<Tenant>, ApiError> {
    require_permission(&ctx, "tenants:write")?;
    let tenant = state.tenants.update_status(&id, req.status).await?;
    Ok(Json(tenant))
}

#[derive(Debug, Deserialize)]
pub struct DeleteTenantQuery {
    #[serde(default)]
    pub force: bool,
}

/// Whether `tenant_id` still owns rows in any backend. Computed here rather
/// than trusted from the request, since a client-supplied flag would let a
/// caller bypass the force-delete guard by simply claiming no data exists.
async fn owns_data(state: &AppState, tenant_id: &str) -> Result<bool, ApiError> {
    let vector_stats = state.vector_store.stats(tenant_id).await?;
    let graph_stats = state.graph_store.stats(tenant_id).await?;
    Ok(vector_stats.documents > 0 || graph_stats.entities > 0 || graph_stats.relationships > 0 || graph_stats.facts > 0)
}

/// Deletes the tenant record, then cascades the delete across every backend
/// that holds per-tenant data: vector store, graph store, sessions, and any
/// bound external-search document set.
pub async fn delete_tenant(
    State(state): State<AppState>,
    Authenticated(ctx): Authenticated,
    Path(id): Path<String>,
    Query(q): Query<DeleteTenantQuery>,
) -> Result<(), ApiError> {
    require_permission(&ctx, "tenants:delete")?;
    let owns_data = owns_data(&state, &id).await?;
    state.tenants.delete(&id, q.force, owns_data).await?;

    if let Err(e) = state.vector_store.delete_tenant(&id).await {
        tracing::warn!(tenant_id = %id, error = %e, "vector store cascade delete failed");
    }
    if let Err(e) = state.graph_store.delete_tenant(&id).await {
        tracing::warn!(tenant_id = %id, error = %e, "graph store cascade delete failed");
    }
    if let Err(e) = state.auth.clear_tenant_sessions(&id).await {
        tracing::warn!(tenant_id = %id, error = %e, "session cascade delete failed");
    }
    if let Some(ess) = &state.ess {
        if let Err(e) = ess.clear_tenant_binding(&id).await {
            tracing::warn!(tenant_id = %id, error = %e, "ess binding cascade delete failed");
        }
    }

    Ok(())
}
