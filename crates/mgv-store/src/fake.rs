// SPDX-License-Identifier: Apache-2.0

use crate::source::DataSource;
use async_trait::async_trait;
use mgv_core::{Error, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// In-memory data source for tests: a url -> bytes table with fetch counters.
#[derive(Default)]
pub struct FakeDataSource {
    responses: Mutex<HashMap<String, Vec<u8>>>,
    per_url_calls: Mutex<HashMap<String, u64>>,
    pub fetch_calls: AtomicU64,
    pub slow_read_delay: Duration,
}

impl FakeDataSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            slow_read_delay: delay,
            ..Self::default()
        }
    }

    pub fn insert(&self, url: impl Into<String>, bytes: impl Into<Vec<u8>>) {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(url.into(), bytes.into());
    }

    pub fn insert_json(&self, url: impl Into<String>, value: &Value) {
        self.insert(url, value.to_string());
    }

    #[must_use]
    pub fn fetch_count(&self, url: &str) -> u64 {
        self.per_url_calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(url)
            .copied()
            .unwrap_or(0)
    }

    #[must_use]
    pub fn total_fetches(&self) -> u64 {
        self.fetch_calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl DataSource for FakeDataSource {
    fn backend_tag(&self) -> &'static str {
        "fake"
    }

    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>> {
        self.fetch_calls.fetch_add(1, Ordering::Relaxed);
        *self
            .per_url_calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(url.to_string())
            .or_insert(0) += 1;
        if !self.slow_read_delay.is_zero() {
            tokio::time::sleep(self.slow_read_delay).await;
        }
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(url)
            .cloned()
            .ok_or_else(|| Error::network(format!("not found url={url}")))
    }
}
