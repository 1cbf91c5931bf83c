use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;

use crate::models::{CheckStatusRequest, CheckStatusResponse};
use crate::AppState;

/// POST /check_status - Check a single stream URL
///
/// One request checks one URL. Clients checking a whole playlist issue one
/// call per channel.
pub async fn check_status(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CheckStatusRequest>,
) -> Result<impl IntoResponse, (StatusCode, Json<serde_json::Value>)> {
    let stream_url = payload.stream_url.trim();
    if stream_url.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": "Stream URL is required." })),
        ));
    }

    let status = state.checker.check_status(stream_url).await;
    Ok(Json(CheckStatusResponse { status }))
}
