//! In-memory bucket store

use super::{CacheStore, CachedEntry};
use crate::error::{ProxyError, ProxyResult};
use crate::http::CacheKey;
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

type Bucket = BTreeMap<CacheKey, CachedEntry>;

/// Buckets held in process memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    buckets: RwLock<BTreeMap<String, Bucket>>,
    /// Max entries per bucket (`None` = unbounded)
    quota: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that refuses writes once a bucket holds `max_entries`
    pub fn with_quota(max_entries: usize) -> Self {
        Self {
            buckets: RwLock::default(),
            quota: Some(max_entries),
        }
    }

    /// Entry count after adding `incoming` keys to `bucket`
    fn projected_len(bucket: Option<&Bucket>, incoming: &[&CacheKey]) -> usize {
        let existing = bucket.map(|b| b.len()).unwrap_or(0);
        let new_keys = incoming
            .iter()
            .filter(|k| bucket.map_or(true, |b| !b.contains_key(**k)))
            .collect::<std::collections::BTreeSet<_>>()
            .len();
        existing + new_keys
    }

    fn check_quota(
        &self,
        name: &str,
        bucket: Option<&Bucket>,
        incoming: &[&CacheKey],
    ) -> ProxyResult<()> {
        if let Some(max) = self.quota {
            if Self::projected_len(bucket, incoming) > max {
                return Err(ProxyError::QuotaExceeded {
                    bucket: name.to_string(),
                });
            }
        }
        Ok(())
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, bucket: &str, key: &CacheKey) -> ProxyResult<Option<CachedEntry>> {
        let buckets = self.buckets.read().await;
        Ok(buckets.get(bucket).and_then(|b| b.get(key)).cloned())
    }

    async fn put(&self, bucket: &str, entry: CachedEntry) -> ProxyResult<()> {
        let mut buckets = self.buckets.write().await;
        self.check_quota(bucket, buckets.get(bucket), &[&entry.key])?;
        buckets
            .entry(bucket.to_string())
            .or_default()
            .insert(entry.key.clone(), entry);
        Ok(())
    }

    async fn put_all(&self, bucket: &str, entries: Vec<CachedEntry>) -> ProxyResult<()> {
        let mut buckets = self.buckets.write().await;
        let keys: Vec<&CacheKey> = entries.iter().map(|e| &e.key).collect();
        self.check_quota(bucket, buckets.get(bucket), &keys)?;

        let target = buckets.entry(bucket.to_string()).or_default();
        for entry in entries {
            target.insert(entry.key.clone(), entry);
        }
        Ok(())
    }

    async fn keys(&self, bucket: &str) -> ProxyResult<Vec<CacheKey>> {
        let buckets = self.buckets.read().await;
        Ok(buckets
            .get(bucket)
            .map(|b| b.keys().cloned().collect())
            .unwrap_or_default())
    }

    async fn delete_bucket(&self, bucket: &str) -> ProxyResult<bool> {
        Ok(self.buckets.write().await.remove(bucket).is_some())
    }

    async fn list_buckets(&self) -> ProxyResult<Vec<String>> {
        Ok(self.buckets.read().await.keys().cloned().collect())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
