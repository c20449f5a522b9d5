//! Assistant chat proxy endpoint.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use tracing::{error, warn};

use super::AppState;
use crate::clients::ChatRequest;
use crate::error::{Error, UpstreamError};

pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> impl IntoResponse {
    match state.assistant.chat(&request).await {
        Ok(reply) => (StatusCode::OK, Json(serde_json::json!({"response": reply}))),
        Err(Error::Config(e)) => {
            error!(error = %e, "Assistant is not configured");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": "Assistant is not configured"})),
            )
        }
        Err(Error::Upstream(UpstreamError::Status { status, detail, .. })) => {
            warn!(status, detail = %detail, "Assistant upstream rejected the request");
            (
                StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY),
                Json(serde_json::json!({"error": "Failed to get response from assistant"})),
            )
        }
        Err(e) => {
            warn!(error = %e, "Assistant request failed");
            (
                StatusCode::BAD_GATEWAY,
                Json(serde_json::json!({"error": "Failed to get response from assistant"})),
            )
        }
    }
}
