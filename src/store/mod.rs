//! Bucket storage behind the proxy
//!
//! The proxy never touches storage directly; it talks to a [`CacheStore`]
//! handed to it at construction. Buckets are namespaces of
//! request-to-response snapshots, addressed by name (the version tag).
//!
//! # Backends
//!
//! | Backend | Persistence | Use |
//! |---------|-------------|-----|
//! | [`MemoryStore`] | process lifetime | tests, `store.backend = "memory"` |
//! | [`DiskStore`] | one directory per bucket | CLI default |

mod disk;
mod memory;

pub use disk::DiskStore;
pub use memory::MemoryStore;

use crate::config::schema::StoreConfig;
use crate::config::ConfigManager;
use crate::error::{ProxyError, ProxyResult};
use crate::http::{CacheKey, Response};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A stored response snapshot.
///
/// Never guaranteed fresh; a later write for the same key replaces it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedEntry {
    pub key: CacheKey,
    pub response: Response,
    pub stored_at: DateTime<Utc>,
}

impl CachedEntry {
    /// Snapshot `response` under `key`, stamped now
    pub fn new(key: CacheKey, response: Response) -> Self {
        Self {
            key,
            response,
            stored_at: Utc::now(),
        }
    }
}

/// Versioned namespace storage for cached responses
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Look up `key` in `bucket`; a missing bucket is a miss
    async fn get(&self, bucket: &str, key: &CacheKey) -> ProxyResult<Option<CachedEntry>>;

    /// Store one entry, creating the bucket if needed and overwriting any
    /// previous entry for the same key
    async fn put(&self, bucket: &str, entry: CachedEntry) -> ProxyResult<()>;

    /// Store every entry or none of them
    async fn put_all(&self, bucket: &str, entries: Vec<CachedEntry>) -> ProxyResult<()>;

    /// Keys currently stored in `bucket`, sorted
    async fn keys(&self, bucket: &str) -> ProxyResult<Vec<CacheKey>>;

    /// Delete a whole bucket, returning whether it existed
    async fn delete_bucket(&self, bucket: &str) -> ProxyResult<bool>;

    /// Names of all existing buckets, sorted
    async fn list_buckets(&self) -> ProxyResult<Vec<String>>;

    /// Human-readable backend name for display
    fn backend_name(&self) -> &'static str;
}

/// Create the store selected by `config.backend`
pub fn create_store(config: &StoreConfig) -> ProxyResult<Arc<dyn CacheStore>> {
    match config.backend.as_str() {
        "memory" => Ok(Arc::new(MemoryStore::new())),
        "disk" => {
            let root = config
                .dir
                .clone()
                .unwrap_or_else(ConfigManager::buckets_dir);
            Ok(Arc::new(DiskStore::new(root)))
        }
        other => Err(ProxyError::User(format!(
            "Unknown store backend: {}",
            other
        ))),
    }
}
