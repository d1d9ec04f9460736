// ABOUTME: ApiError wraps MeridianError and renders each variant to its HTTP status code
// ABOUTME: Every crate's error enum already converts to MeridianError, so one blanket From covers them all

use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use meridian_core::error::MeridianError;
use serde_json::json;

#[derive(Debug)]
pub struct ApiError(pub MeridianError);

impl<E> From<E> for ApiError
where
    E: Into<MeridianError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, retry_after_secs) = match &self.0 {
            MeridianError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, None),
            MeridianError::Forbidden(_) => (StatusCode::FORBIDDEN, None),
            MeridianError::RateLimited { retry_after_secs, .. } => {
                (StatusCode::TOO_MANY_REQUESTS, *retry_after_secs)
            }
            MeridianError::TenantUnavailable(_) => (StatusCode::NOT_FOUND, None),
            MeridianError::QuotaExceeded(_) => (StatusCode::CONFLICT, None),
            MeridianError::ValidationFailed(_) => (StatusCode::BAD_REQUEST, None),
            MeridianError::AlreadyExists(_) => (StatusCode::CONFLICT, None),
            MeridianError::NotFound(_) => (StatusCode::NOT_FOUND, None),
            MeridianError::BackendTransient { .. } | MeridianError::BackendUnavailable { .. } => {
                (StatusCode::SERVICE_UNAVAILABLE, None)
            }
            MeridianError::IsolationViolation { component, message } => {
                tracing::error!(component, message, "isolation violation reached the HTTP edge");
                (StatusCode::INTERNAL_SERVER_ERROR, None)
            }
            MeridianError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, None),
        };

        let body = Json(json!({ "error": self.0.to_string() }));
        let mut response = (status, body).into_response();
        if let Some(secs) = retry_after_secs {
            if let Ok(value) = HeaderValue::from_str(&secs.to_string()) {
                response.headers_mut().insert("Retry-After", value);
            }
        }
        response
    }
}
