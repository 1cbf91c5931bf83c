use encoding_rs::{Encoding, WINDOWS_1252};
use futures::StreamExt;
use reqwest::{header::CONTENT_TYPE, Client};
use std::time::Duration;
use thiserror::Error;

/// Playlist download failures
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("timed out fetching playlist")]
    Timeout,
    #[error("HTTP {status}: {reason}")]
    Http { status: u16, reason: String },
    #[error("playlist too large (limit {limit_mb}MB)")]
    TooLarge { limit_mb: usize },
    #[error("network error: {0}")]
    Network(String),
    #[error("failed to create HTTP client: {0}")]
    Client(String),
}

impl FetchError {
    fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else {
            FetchError::Network(err.to_string())
        }
    }

    /// Short label used for metrics
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Timeout => "timeout",
            FetchError::Http { .. } => "http_error",
            FetchError::TooLarge { .. } => "too_large",
            FetchError::Network(_) => "network_error",
            FetchError::Client(_) => "client_error",
        }
    }
}

/// Downloads playlist files
#[derive(Clone)]
pub struct PlaylistFetcher {
    client: Client,
    max_m3u_size_mb: usize,
}

impl PlaylistFetcher {
    pub fn new(user_agent: &str, timeout_ms: u64, max_m3u_size_mb: usize) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_millis(timeout_ms))
            .gzip(true)
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self {
            client,
            max_m3u_size_mb,
        })
    }

    fn max_bytes(&self) -> u64 {
        (self.max_m3u_size_mb as u64) * 1024 * 1024
    }

    /// Fetch a playlist and decode it to text
    pub async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let (bytes, charset) = self.fetch_bytes(url).await?;
        Ok(decode_playlist(&bytes, charset.as_deref()))
    }

    /// Body bytes plus the charset declared in `Content-Type`, if any
    async fn fetch_bytes(&self, url: &str) -> Result<(Vec<u8>, Option<String>), FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(FetchError::from_reqwest)?;

        let status = response.status();
        if !status.is_success() {
            let reason = status
                .canonical_reason()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "Error".to_string());
            return Err(FetchError::Http {
                status: status.as_u16(),
                reason,
            });
        }

        let charset = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .and_then(charset_from_content_type);

        let max_bytes = self.max_bytes();
        let limit_mb = self.max_m3u_size_mb;
        let too_large = || FetchError::TooLarge { limit_mb };

        if let Some(len) = response.content_length() {
            if len > max_bytes {
                return Err(too_large());
            }
            tracing::info!("Playlist size: {:.2} MB", len as f64 / 1024.0 / 1024.0);
        }

        // Content-Length may be missing or wrong, so the cap is enforced on the stream too
        let mut body = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(FetchError::from_reqwest)?;
            if (body.len() + chunk.len()) as u64 > max_bytes {
                return Err(too_large());
            }
            body.extend_from_slice(&chunk);
        }

        Ok((body, charset))
    }
}

/// Extract the `charset` parameter from a Content-Type value
fn charset_from_content_type(content_type: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        if !key.trim().eq_ignore_ascii_case("charset") {
            return None;
        }
        let value = value.trim().trim_matches('"');
        (!value.is_empty()).then(|| value.to_string())
    })
}

/// Decode playlist bytes.
///
/// UTF-8 is tried first. Otherwise the declared charset is used, and
/// Windows-1252 (a Latin-1 superset) when none is declared or it is unknown.
pub fn decode_playlist(bytes: &[u8], charset: Option<&str>) -> String {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    if let Ok(text) = std::str::from_utf8(bytes) {
        return text.to_string();
    }

    let encoding = charset
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .unwrap_or(WINDOWS_1252);
    let (text, _, _) = encoding.decode(bytes);
    text.into_owned()
}
