// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use mgv_core::{Error, MgvConfig, Result};
use serde_json::Value;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::location::has_scheme;

/// Raw byte transport behind discovery and track reads.
#[async_trait]
pub trait DataSource: Send + Sync {
    fn backend_tag(&self) -> &'static str;

    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>>;

    async fn fetch_json(&self, url: &str) -> Result<Value> {
        let bytes = self.fetch_bytes(url).await?;
        serde_json::from_slice(&bytes)
            .map_err(|e| Error::decode(format!("invalid json from {url}: {e}")))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub base_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_backoff_ms: 120,
        }
    }
}

impl RetryPolicy {
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: usize) -> Duration {
        Duration::from_millis(self.base_backoff_ms.saturating_mul(attempt as u64))
    }
}

/// HTTP(S) transport with linear backoff.
///
/// `file://` urls and scheme-less locations are read from disk. The file name
/// is the whole path including any query string, which is how a `wget`
/// mirror of the data server stores `fetch.cgi?...` responses.
pub struct HttpDataSource {
    client: reqwest::Client,
    retry: RetryPolicy,
}

impl HttpDataSource {
    pub fn new(timeout: Duration, retry: RetryPolicy) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::network(format!("http client init failed: {e}")))?;
        Ok(Self { client, retry })
    }

    pub fn from_config(config: &MgvConfig) -> Result<Self> {
        Self::new(
            Duration::from_millis(config.http_timeout_ms),
            RetryPolicy {
                max_attempts: config.http_max_attempts.max(1),
                ..RetryPolicy::default()
            },
        )
    }

    #[must_use]
    pub fn retry(&self) -> &RetryPolicy {
        &self.retry
    }

    #[instrument(name = "http_get_with_retry", skip(self))]
    async fn get_with_retry(&self, url: &str) -> Result<Vec<u8>> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.client.get(url).send().await {
                Ok(resp) if resp.status().is_success() => {
                    return resp
                        .bytes()
                        .await
                        .map(|b| b.to_vec())
                        .map_err(|e| Error::network(format!("read body failed url={url}: {e}")));
                }
                Ok(resp) if resp.status() == reqwest::StatusCode::NOT_FOUND => {
                    return Err(Error::network(format!("not found url={url}")));
                }
                Ok(resp) => {
                    if attempt >= self.retry.max_attempts {
                        return Err(Error::network(format!(
                            "download failed status={} url={url}",
                            resp.status()
                        )));
                    }
                    warn!(status = %resp.status(), attempt, "retrying download");
                }
                Err(e) => {
                    if attempt >= self.retry.max_attempts {
                        return Err(Error::network(format!("download failed url={url}: {e}")));
                    }
                    warn!(error = %e, attempt, "retrying download");
                }
            }
            tokio::time::sleep(self.retry.delay_for_attempt(attempt)).await;
        }
    }

    async fn read_file(path: &Path) -> Result<Vec<u8>> {
        debug!(path = %path.display(), "reading local data file");
        tokio::fs::read(path)
            .await
            .map_err(|e| Error::network(format!("read failed {}: {e}", path.display())))
    }
}

#[async_trait]
impl DataSource for HttpDataSource {
    fn backend_tag(&self) -> &'static str {
        "http"
    }

    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        if let Some(path) = url.strip_prefix("file://") {
            return Self::read_file(Path::new(path)).await;
        }
        if !has_scheme(url) {
            return Self::read_file(Path::new(url)).await;
        }
        if url.starts_with("http://") || url.starts_with("https://") {
            return self.get_with_retry(url).await;
        }
        Err(Error::network(format!("unsupported url scheme: {url}")))
    }
}
