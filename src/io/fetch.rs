//! Source retrieval.
//!
//! The analytics core never touches the network; this shell downloads the
//! source CSV (or reads a local copy) and hands bytes to `ingest`.

use std::path::Path;
use std::thread;
use std::time::Duration;

use log::{info, warn};
use reqwest::blocking::Client;

use crate::error::AppError;

/// Blocking HTTP client with a per-request timeout and bounded retries.
pub struct SourceClient {
    client: Client,
    attempts: u32,
    backoff: Duration,
}

impl SourceClient {
    pub fn new(timeout: Duration, retries: u32) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("epi-dash/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AppError::new(4, format!("Failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            attempts: retries.saturating_add(1),
            backoff: Duration::from_secs(2),
        })
    }

    /// Download `url`, retrying transport failures and non-success statuses.
    pub fn fetch(&self, url: &str) -> Result<Vec<u8>, AppError> {
        let mut last_err = AppError::new(4, format!("No attempt made to fetch {url}."));

        for attempt in 1..=self.attempts {
            match self.fetch_once(url) {
                Ok(body) => {
                    info!("Fetched {} byte(s) from {url}", body.len());
                    return Ok(body);
                }
                Err(err) => {
                    warn!("Fetch attempt {attempt}/{} failed: {err}", self.attempts);
                    last_err = err;
                }
            }
            if attempt < self.attempts {
                thread::sleep(self.backoff * attempt);
            }
        }

        Err(last_err)
    }

    fn fetch_once(&self, url: &str) -> Result<Vec<u8>, AppError> {
        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|e| AppError::new(4, format!("Source request failed: {e}")))?;

        if !resp.status().is_success() {
            return Err(AppError::new(
                4,
                format!("Source request failed with status {}.", resp.status()),
            ));
        }

        let body = resp
            .bytes()
            .map_err(|e| AppError::new(4, format!("Failed to read source response: {e}")))?;
        Ok(body.to_vec())
    }
}

/// Whether a configured source names a remote URL rather than a local file.
pub fn is_remote(source: &str) -> bool {
    let lower = source.trim().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Load source bytes from a URL or a local path.
pub fn load_source(source: &str, timeout: Duration, retries: u32) -> Result<Vec<u8>, AppError> {
    if is_remote(source) {
        return SourceClient::new(timeout, retries)?.fetch(source.trim());
    }
    let path = Path::new(source);
    let bytes = std::fs::read(path)
        .map_err(|e| AppError::new(2, format!("Failed to read source '{}': {e}", path.display())))?;
    info!("Read {} byte(s) from {}", bytes.len(), path.display());
    Ok(bytes)
}
