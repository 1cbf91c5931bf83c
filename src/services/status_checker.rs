//! Stream reachability checks
//!
//! A check is a single GET with a transport-enforced timeout. Only a small
//! prefix of the body is read, then the response is dropped so the connection
//! is released. The prefix is sniffed for the `#EXTM3U` signature.
//!
//! Every outcome maps to a [`StreamStatus`] label; network failures are never
//! surfaced as errors.

use reqwest::{Client, Response};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, error};

use crate::models::StreamStatus;
use crate::services::metrics;

/// Playlist file signature
const M3U_SIGNATURE: &str = "#EXTM3U";

/// Redirect hops followed before giving up
const MAX_REDIRECTS: usize = 10;

/// Single-URL reachability checker
#[derive(Clone)]
pub struct StreamChecker {
    client: Client,
    timeout: Duration,
    probe_bytes: usize,
}

impl StreamChecker {
    /// Create a new checker
    ///
    /// # Arguments
    /// * `user_agent` - sent with every probe, browser-like by default
    /// * `timeout` - total time budget for a probe, body read included
    /// * `probe_bytes` - maximum number of body bytes inspected
    pub fn new(user_agent: &str, timeout: Duration, probe_bytes: usize) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            // sniff the raw bytes, not a decompressed body
            .gzip(false)
            // no connection reuse across checks
            .pool_max_idle_per_host(0)
            .build()?;

        Ok(Self {
            client,
            timeout,
            probe_bytes,
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Check a URL with the default timeout
    pub async fn check_status(&self, url: &str) -> StreamStatus {
        self.check_status_with_timeout(url, self.timeout).await
    }

    /// Check a URL with an explicit timeout
    pub async fn check_status_with_timeout(&self, url: &str, timeout: Duration) -> StreamStatus {
        let url = url.trim();
        if url.is_empty() {
            return StreamStatus::NotAvailable;
        }

        let checker = self.clone();
        let target = url.to_string();
        let status = run_isolated(url, async move { checker.probe(&target, timeout).await }).await;

        debug!("Checked {} -> {}", url, status);
        metrics::STREAM_CHECKS
            .with_label_values(&[status.class().as_str()])
            .inc();

        status
    }

    async fn probe(&self, url: &str, timeout: Duration) -> StreamStatus {
        let response = match self.client.get(url).timeout(timeout).send().await {
            Ok(response) => response,
            Err(e) if e.is_timeout() => return StreamStatus::Timeout,
            Err(e) => {
                debug!("Request error for {}: {}", url, e);
                return StreamStatus::ConnectionError;
            }
        };

        let status = response.status();
        if !(status.is_success() || status.is_redirection()) {
            return StreamStatus::HttpError(status.as_u16());
        }

        match read_prefix(response, self.probe_bytes).await {
            Ok(prefix) => sniff(&prefix),
            Err(e) => {
                debug!("Error reading stream prefix from {}: {}", url, e);
                StreamStatus::ProcessingError
            }
        }
    }
}

/// Run a check in its own task so a panic becomes [`StreamStatus::Error`]
async fn run_isolated<F>(url: &str, check: F) -> StreamStatus
where
    F: Future<Output = StreamStatus> + Send + 'static,
{
    match tokio::spawn(check).await {
        Ok(status) => status,
        Err(e) => {
            error!("Unexpected error checking {}: {}", url, e);
            StreamStatus::Error
        }
    }
}

/// Read at most `limit` body bytes. The response is consumed and dropped.
async fn read_prefix(mut response: Response, limit: usize) -> Result<Vec<u8>, reqwest::Error> {
    let mut prefix = Vec::with_capacity(limit);
    while prefix.len() < limit {
        match response.chunk().await? {
            Some(chunk) => {
                let take = chunk.len().min(limit - prefix.len());
                prefix.extend_from_slice(&chunk[..take]);
            }
            None => break,
        }
    }
    Ok(prefix)
}

/// Classify a body prefix. The lenient decode cannot fail, so anything
/// reachable without the signature is other content, binary included.
fn sniff(prefix: &[u8]) -> StreamStatus {
    if lenient_decode(prefix).contains(M3U_SIGNATURE) {
        StreamStatus::Stream
    } else {
        StreamStatus::OtherContent
    }
}

/// UTF-8 decode that drops invalid bytes
fn lenient_decode(bytes: &[u8]) -> String {
    bytes.utf8_chunks().map(|chunk| chunk.valid()).collect()
}
