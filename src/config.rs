use std::env;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub port: u16,
    pub app_env: String,
    pub static_dir: Option<String>,

    // Playlist download
    pub fetch_timeout_ms: u64,
    pub max_m3u_size_mb: usize,
    pub user_agent: String,

    // Stream checks
    pub check_timeout_ms: u64,
    pub probe_bytes: usize,
    pub probe_user_agent: String,
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self {
            // Server
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            app_env: env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
            static_dir: env::var("STATIC_DIR").ok().filter(|dir| !dir.trim().is_empty()),

            // Playlist download
            fetch_timeout_ms: env::var("FETCH_TIMEOUT_MS")
                .unwrap_or_else(|_| "30000".to_string())
                .parse()
                .unwrap_or(30_000), // 30 seconds

            max_m3u_size_mb: env::var("MAX_M3U_SIZE_MB")
                .unwrap_or_else(|_| "50".to_string())
                .parse()
                .unwrap_or(50),

            // IPTV servers tend to accept player user agents
            user_agent: env::var("USER_AGENT")
                .unwrap_or_else(|_| "VLC/3.0.20 LibVLC/3.0.20".to_string()),

            // Stream checks
            check_timeout_ms: env::var("CHECK_TIMEOUT_MS")
                .unwrap_or_else(|_| "8000".to_string())
                .parse()
                .unwrap_or(8_000), // 8 seconds

            probe_bytes: env::var("PROBE_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|n: &usize| *n > 0)
                .unwrap_or(1024),

            // Browser-like so that probes are not rejected outright
            probe_user_agent: env::var("PROBE_USER_AGENT")
                .unwrap_or_else(|_| "Mozilla/5.0".to_string()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
