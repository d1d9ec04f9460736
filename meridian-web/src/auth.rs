// ABOUTME: Bearer-token extraction into AuthContext, plus the permission-model enforcement helper
// ABOUTME: Permission strings follow meridian-security::AuthContext::has_permission's prefix-wildcard rules

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use meridian_core::error::MeridianError;
use meridian_security::AuthContext;

use crate::error::ApiError;
use crate::state::AppState;

/// Extracts and verifies the `Authorization: Bearer <token>` header,
/// yielding the caller's `AuthContext`. Every route except `/health` uses
/// this extractor, so a missing or invalid token fails before the handler
/// body runs.
pub struct Authenticated(pub AuthContext);

impl FromRequestParts<AppState> for Authenticated {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| MeridianError::Unauthorized("missing Authorization header".to_string()))?;
        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| MeridianError::Unauthorized("Authorization header is not a bearer token".to_string()))?;
        let ctx = state.auth.authenticate(token).await?;
        Ok(Self(ctx))
    }
}

/// Enforces the permission model: `"admin"` grants everything, an exact
/// permission string matches, and a `prefix:*` granted permission covers
/// anything under that prefix.
pub fn require_permission(ctx: &AuthContext, permission: &str) -> Result<(), ApiError> {
    if ctx.has_permission(permission) {
        Ok(())
    } else {
        Err(MeridianError::Forbidden(format!("missing permission: {permission}")).into())
    }
}
