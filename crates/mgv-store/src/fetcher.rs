// SPDX-License-Identifier: Apache-2.0

use crate::byte_cache::ByteCache;
use crate::source::DataSource;
use mgv_core::Result;
use std::sync::Arc;
use tracing::{debug, warn};

/// Read-through byte fetcher scoped to one cache namespace (a genome path).
#[derive(Clone)]
pub struct CachingFetcher {
    source: Arc<dyn DataSource>,
    cache: Arc<dyn ByteCache>,
    namespace: String,
}

impl CachingFetcher {
    #[must_use]
    pub fn new(
        source: Arc<dyn DataSource>,
        cache: Arc<dyn ByteCache>,
        namespace: impl Into<String>,
    ) -> Self {
        Self {
            source,
            cache,
            namespace: namespace.into(),
        }
    }

    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        if let Some(bytes) = self.cache.get(&self.namespace, url).await? {
            debug!(namespace = %self.namespace, url, "byte cache hit");
            return Ok(bytes);
        }
        let bytes = self.source.fetch_bytes(url).await?;
        if let Err(err) = self.cache.put(&self.namespace, url, &bytes).await {
            warn!(namespace = %self.namespace, url, error = %err, "byte cache write failed");
        }
        Ok(bytes)
    }

    pub async fn clear_namespace(&self) -> Result<()> {
        debug!(namespace = %self.namespace, "clearing byte cache namespace");
        self.cache.clear_namespace(&self.namespace).await
    }
}
