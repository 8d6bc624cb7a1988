// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use mgv_core::{sha256_hex, Error, Result};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};

static TMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// Namespaced raw-byte cache. One namespace per genome path.
#[async_trait]
pub trait ByteCache: Send + Sync {
    async fn get(&self, namespace: &str, key: &str) -> Result<Option<Vec<u8>>>;
    async fn put(&self, namespace: &str, key: &str, bytes: &[u8]) -> Result<()>;
    async fn clear_namespace(&self, namespace: &str) -> Result<()>;
}

#[derive(Default)]
pub struct MemoryByteCache {
    namespaces: RwLock<HashMap<String, HashMap<String, Vec<u8>>>>,
}

impl MemoryByteCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn entry_count(&self, namespace: &str) -> usize {
        self.namespaces
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(namespace)
            .map_or(0, HashMap::len)
    }
}

#[async_trait]
impl ByteCache for MemoryByteCache {
    async fn get(&self, namespace: &str, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self
            .namespaces
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(namespace)
            .and_then(|ns| ns.get(key))
            .cloned())
    }

    async fn put(&self, namespace: &str, key: &str, bytes: &[u8]) -> Result<()> {
        self.namespaces
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(namespace.to_string())
            .or_default()
            .insert(key.to_string(), bytes.to_vec());
        Ok(())
    }

    async fn clear_namespace(&self, namespace: &str) -> Result<()> {
        self.namespaces
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(namespace);
        Ok(())
    }
}

/// Directory-backed cache: `<root>/<sha256(namespace)>/<sha256(key)>`.
pub struct FsByteCache {
    root: PathBuf,
}

impl FsByteCache {
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn namespace_dir(&self, namespace: &str) -> PathBuf {
        self.root.join(sha256_hex(namespace.as_bytes()))
    }

    fn entry_path(&self, namespace: &str, key: &str) -> PathBuf {
        self.namespace_dir(namespace).join(sha256_hex(key.as_bytes()))
    }
}

#[async_trait]
impl ByteCache for FsByteCache {
    async fn get(&self, namespace: &str, key: &str) -> Result<Option<Vec<u8>>> {
        match tokio::fs::read(self.entry_path(namespace, key)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::storage(format!("byte cache read failed: {e}"))),
        }
    }

    async fn put(&self, namespace: &str, key: &str, bytes: &[u8]) -> Result<()> {
        let dir = self.namespace_dir(namespace);
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| Error::storage(format!("byte cache mkdir failed: {e}")))?;
        let target = self.entry_path(namespace, key);
        // concurrent writers of one key must not share a temp file
        let tmp = target.with_extension(format!(
            "{}.{}.tmp",
            std::process::id(),
            TMP_SEQ.fetch_add(1, Ordering::Relaxed)
        ));
        tokio::fs::write(&tmp, bytes)
            .await
            .map_err(|e| Error::storage(format!("byte cache write failed: {e}")))?;
        if let Err(e) = tokio::fs::rename(&tmp, &target).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(Error::storage(format!("byte cache rename failed: {e}")));
        }
        Ok(())
    }

    async fn clear_namespace(&self, namespace: &str) -> Result<()> {
        match tokio::fs::remove_dir_all(self.namespace_dir(namespace)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::storage(format!("byte cache clear failed: {e}"))),
        }
    }
}
