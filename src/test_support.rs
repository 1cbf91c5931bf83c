//! In-process upstream server and router helpers for tests

use axum::{
    body::{Body, Bytes},
    http::{header, Request, StatusCode},
    response::{IntoResponse, Redirect},
    routing::get,
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use crate::config::Config;
use crate::{app, AppState};

pub const PLAYLIST: &str = "#EXTM3U\n\
#EXTINF:-1 tvg-logo=\"http://x/logo.png\" group-title=\"News\",Channel A\n\
http://example.com/a.m3u8\n\
#EXTINF:-1,Channel B\n\
http://example.com/b.m3u8\n";

const SLOW_DELAY: Duration = Duration::from_secs(3);

async fn slow() -> &'static str {
    tokio::time::sleep(SLOW_DELAY).await;
    "#EXTM3U\n"
}

async fn stalled_body() -> impl IntoResponse {
    let stream = futures::stream::once(async {
        tokio::time::sleep(SLOW_DELAY).await;
        Ok::<_, std::io::Error>(Bytes::from_static(b"#EXTM3U\n"))
    });
    Body::from_stream(stream)
}

async fn binary() -> impl IntoResponse {
    let mut packet = vec![0x47u8, 0x40, 0x00, 0x10];
    packet.extend(std::iter::repeat(0xffu8).take(184));
    ([(header::CONTENT_TYPE, "video/MP2T")], packet)
}

async fn cp1251_playlist() -> impl IntoResponse {
    let mut body = b"#EXTM3U\n#EXTINF:-1,".to_vec();
    // "Канал" in cp1251
    body.extend_from_slice(b"\xCA\xE0\xED\xE0\xEB\nhttp://s/a\n");
    ([(header::CONTENT_TYPE, "audio/x-mpegurl; charset=windows-1251")], body)
}

async fn late_signature() -> String {
    format!("{}\n#EXTM3U\n", "a".repeat(2048))
}

/// Spawn the upstream server and return its base URL
pub async fn spawn_upstream() -> String {
    let router = Router::new()
        .route("/playlist.m3u", get(|| async { PLAYLIST }))
        .route("/cp1251.m3u", get(cp1251_playlist))
        .route("/empty", get(|| async { "" }))
        .route("/no-channels", get(|| async { "#EXTM3U\n# nothing here\nrtmp://s/live\n" }))
        .route("/text", get(|| async { "<html><body>hello</body></html>" }))
        .route("/binary", get(binary))
        .route("/late-signature", get(late_signature))
        .route("/huge", get(|| async { vec![b'#'; 2 * 1024 * 1024] }))
        .route("/redirect", get(|| async { Redirect::temporary("/playlist.m3u") }))
        .route("/loop", get(|| async { Redirect::temporary("/loop") }))
        .route("/missing", get(|| async { StatusCode::NOT_FOUND }))
        .route("/error", get(|| async { StatusCode::INTERNAL_SERVER_ERROR }))
        .route("/slow", get(slow))
        .route("/stalled-body", get(stalled_body));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    format!("http://{}", addr)
}

pub fn test_config() -> Config {
    Config {
        port: 0,
        app_env: "test".to_string(),
        static_dir: None,
        fetch_timeout_ms: 500,
        max_m3u_size_mb: 1,
        user_agent: "test".to_string(),
        check_timeout_ms: 500,
        probe_bytes: 1024,
        probe_user_agent: "Mozilla/5.0".to_string(),
    }
}

pub fn test_app() -> Router {
    app(Arc::new(AppState::new(test_config()).unwrap()))
}

pub async fn call_get(app: Router, uri: &str) -> (StatusCode, Bytes) {
    let request = Request::get(uri).body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, body)
}

pub async fn call_json(app: Router, uri: &str, payload: serde_json::Value) -> (StatusCode, serde_json::Value) {
    let request = Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}
