//! Property lookup proxy endpoint.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use tracing::warn;

use super::AppState;
use crate::clients::AddressQuery;
use crate::error::UpstreamError;

fn upstream_status(e: &UpstreamError) -> StatusCode {
    match e {
        UpstreamError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        UpstreamError::Transport { .. } | UpstreamError::InvalidResponse { .. } => {
            StatusCode::BAD_GATEWAY
        }
        UpstreamError::NotFound { .. } => StatusCode::NOT_FOUND,
        UpstreamError::Status { status, .. } => {
            StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

pub async fn lookup_property(
    State(state): State<AppState>,
    Json(query): Json<AddressQuery>,
) -> impl IntoResponse {
    if !query.is_searchable() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": "Address or ZIP code is required"})),
        );
    }

    match state.property.lookup(&query).await {
        Ok(record) => (StatusCode::OK, Json(serde_json::json!(record))),
        Err(e) => {
            warn!(error = %e, "Property lookup failed");
            (
                upstream_status(&e),
                Json(serde_json::json!({"error": e.to_string()})),
            )
        }
    }
}
