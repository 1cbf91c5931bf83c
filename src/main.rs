mod config;
mod models;
mod routes;
mod services;

#[cfg(test)]
mod test_support;

use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::services::{playlist_fetcher::PlaylistFetcher, status_checker::StreamChecker};

/// Application state shared across handlers
pub struct AppState {
    pub config: Config,
    pub fetcher: PlaylistFetcher,
    pub checker: StreamChecker,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let fetcher = PlaylistFetcher::new(
            &config.user_agent,
            config.fetch_timeout_ms,
            config.max_m3u_size_mb,
        )?;

        let checker = StreamChecker::new(
            &config.probe_user_agent,
            Duration::from_millis(config.check_timeout_ms),
            config.probe_bytes,
        )?;

        Ok(Self {
            config,
            fetcher,
            checker,
            start_time: Instant::now(),
        })
    }
}

/// Build the application router
pub fn app(state: Arc<AppState>) -> Router {
    let router = Router::new()
        // Health endpoints
        .route("/health", get(routes::health::health_check))
        .route("/metrics", get(routes::health::metrics))
        .route("/ready", get(routes::health::ready))
        .route("/live", get(routes::health::live))
        // Playlist endpoints
        .route("/process", post(routes::playlist::process_playlist))
        .route("/check_status", post(routes::status::check_status));

    // Front-end page, when configured, replaces the JSON root
    let router = match state.config.static_dir.as_deref() {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router.route("/", get(routes::health::root)),
    };

    router
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing/logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "streamcheck_server=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    // Load configuration
    let config = Config::from_env();
    let port = config.port;

    tracing::info!("Starting StreamCheck Server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app_env);
    tracing::info!(
        "Stream checks: {}ms timeout, {} byte prefix",
        config.check_timeout_ms,
        config.probe_bytes
    );
    if let Some(dir) = &config.static_dir {
        tracing::info!("Serving static files from {}", dir);
    }

    let state = Arc::new(AppState::new(config)?);
    let app = app(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
