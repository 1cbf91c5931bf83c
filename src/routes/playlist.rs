use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;
use url::Url;

use crate::models::{ProcessRequest, ProcessResponse};
use crate::services::m3u_parser::parse_playlist;
use crate::services::metrics;
use crate::services::playlist_fetcher::FetchError;
use crate::AppState;

type ApiError = (StatusCode, Json<serde_json::Value>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(serde_json::json!({ "error": message.into() })))
}

/// Only absolute http(s) URLs are fetched
fn is_valid_playlist_url(url: &str) -> bool {
    Url::parse(url)
        .map(|parsed| matches!(parsed.scheme(), "http" | "https") && parsed.has_host())
        .unwrap_or(false)
}

fn fetch_error_response(url: &str, err: &FetchError) -> ApiError {
    match err {
        FetchError::Timeout => api_error(
            StatusCode::GATEWAY_TIMEOUT,
            format!("Timed out fetching M3U file: {}", url),
        ),
        FetchError::Client(_) => api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "An unexpected server error occurred.",
        ),
        _ => api_error(
            StatusCode::BAD_GATEWAY,
            format!("Failed to fetch M3U file: {}", err),
        ),
    }
}

/// POST /process - Fetch a playlist and group its channels
pub async fn process_playlist(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ProcessRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let m3u_url = payload.m3u_url.trim().to_string();
    if m3u_url.is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "M3U URL is required."));
    }
    if !is_valid_playlist_url(&m3u_url) {
        return Err(api_error(StatusCode::BAD_REQUEST, "Invalid M3U URL."));
    }

    tracing::info!("Fetching M3U from: {}", m3u_url);

    let content = state.fetcher.fetch(&m3u_url).await.map_err(|e| {
        tracing::warn!("Failed to fetch M3U from {}: {}", m3u_url, e);
        metrics::PLAYLIST_FETCHES.with_label_values(&[e.kind()]).inc();
        fetch_error_response(&m3u_url, &e)
    })?;
    metrics::PLAYLIST_FETCHES.with_label_values(&["ok"]).inc();

    let has_content = !content.trim().is_empty();

    // large playlists should not stall the runtime
    let groups = tokio::task::spawn_blocking(move || parse_playlist(&content))
        .await
        .map_err(|e| {
            tracing::error!("Unexpected error while parsing {}: {}", m3u_url, e);
            api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "An unexpected server error occurred.",
            )
        })?;

    metrics::CHANNELS_PARSED.inc_by(groups.channel_count() as u64);
    tracing::info!(
        "Parsed {}: {} channels in {} groups",
        m3u_url,
        groups.channel_count(),
        groups.group_count()
    );

    let message = if !groups.is_empty() {
        None
    } else if has_content {
        Some("M3U file was found, but no channels were found or the format is unexpected.".to_string())
    } else {
        Some("M3U file is empty or no data was returned.".to_string())
    };

    Ok(Json(ProcessResponse { groups, message }))
}
