//! On-disk bucket store
//!
//! Layout under the store root:
//!
//! ```text
//! <sha256(bucket)>/bucket.json          {"name": "<bucket>"}
//! <sha256(bucket)>/entries/<sha256(key)>.json
//! .staging-<uuid>/                      in-flight bulk writes
//! ```
//!
//! A bulk write builds the complete bucket (existing entries plus the new
//! ones) in a staging directory and renames it over the old one, so a
//! failure at any point leaves the previous contents intact. A single
//! `put` racing a bulk write to the same bucket may be lost.
//!
//! Directory names are digests so any bucket name or URL is a safe path.

use super::{CacheStore, CachedEntry};
use crate::error::{ProxyError, ProxyResult};
use crate::http::CacheKey;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};
use uuid::Uuid;

const BUCKET_META: &str = "bucket.json";
const ENTRIES_DIR: &str = "entries";
const STAGING_PREFIX: &str = ".staging-";

#[derive(Debug, Serialize, Deserialize)]
struct BucketMeta {
    name: String,
}

/// Buckets persisted as JSON files under a root directory
#[derive(Debug, Clone)]
pub struct DiskStore {
    root: PathBuf,
}

impl DiskStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory of the store
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn bucket_dir(&self, bucket: &str) -> PathBuf {
        self.root.join(digest(bucket))
    }

    fn entry_file_name(key: &CacheKey) -> String {
        format!("{}.json", digest(key.as_str()))
    }

    /// Create the bucket directory and its metadata if missing
    async fn ensure_bucket(&self, bucket: &str) -> ProxyResult<PathBuf> {
        let dir = self.bucket_dir(bucket);
        let entries = dir.join(ENTRIES_DIR);
        fs::create_dir_all(&entries)
            .await
            .map_err(|e| ProxyError::io(format!("creating bucket {}", bucket), e))?;

        let meta_path = dir.join(BUCKET_META);
        if !meta_path.exists() {
            let meta = BucketMeta {
                name: bucket.to_string(),
            };
            write_json(&meta_path, &meta).await?;
        }
        Ok(dir)
    }

    /// Write every entry into a fresh staging directory
    async fn stage(
        &self,
        staging: &Path,
        bucket: &str,
        entries: &[CachedEntry],
    ) -> ProxyResult<()> {
        let staged_entries = staging.join(ENTRIES_DIR);
        fs::create_dir_all(&staged_entries)
            .await
            .map_err(|e| ProxyError::io("creating staging directory", e))?;

        let meta = BucketMeta {
            name: bucket.to_string(),
        };
        write_json(&staging.join(BUCKET_META), &meta).await?;

        for entry in entries {
            write_json(&staged_entries.join(Self::entry_file_name(&entry.key)), entry).await?;
        }
        Ok(())
    }

    /// Copy the bucket's current entries into `staging`, skipping keys
    /// that were staged with new content
    async fn carry_over(&self, target: &Path, staging: &Path) -> ProxyResult<()> {
        let staged = staging.join(ENTRIES_DIR);
        let mut dir = fs::read_dir(target.join(ENTRIES_DIR))
            .await
            .map_err(|e| ProxyError::io("reading bucket entries", e))?;

        while let Some(file) = dir
            .next_entry()
            .await
            .map_err(|e| ProxyError::io("reading bucket entry", e))?
        {
            let dest = staged.join(file.file_name());
            if dest.exists() {
                continue;
            }
            fs::copy(file.path(), &dest)
                .await
                .map_err(|e| ProxyError::io(format!("carrying over {}", file.path().display()), e))?;
        }
        Ok(())
    }

    /// Replace `target` with the complete bucket in `staging`.
    ///
    /// The old directory is set aside under a staging name first and put
    /// back if the new one cannot be moved into place.
    async fn swap_in(&self, staging: &Path, target: &Path, bucket: &str) -> ProxyResult<()> {
        let retired = self
            .root
            .join(format!("{}{}", STAGING_PREFIX, Uuid::new_v4()));
        fs::rename(target, &retired)
            .await
            .map_err(|e| ProxyError::io(format!("retiring bucket {}", bucket), e))?;

        if let Err(e) = fs::rename(staging, target).await {
            if let Err(restore) = fs::rename(&retired, target).await {
                warn!("Failed to restore bucket {}: {}", bucket, restore);
            }
            return Err(ProxyError::io(format!("committing bucket {}", bucket), e));
        }

        remove_quietly(&retired).await;
        Ok(())
    }
}

#[async_trait]
impl CacheStore for DiskStore {
    async fn get(&self, bucket: &str, key: &CacheKey) -> ProxyResult<Option<CachedEntry>> {
        let path = self
            .bucket_dir(bucket)
            .join(ENTRIES_DIR)
            .join(Self::entry_file_name(key));

        match fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ProxyError::io(format!("reading {}", path.display()), e)),
        }
    }

    async fn put(&self, bucket: &str, entry: CachedEntry) -> ProxyResult<()> {
        let dir = self.ensure_bucket(bucket).await?;
        let path = dir.join(ENTRIES_DIR).join(Self::entry_file_name(&entry.key));

        // Unique temp name so concurrent writers of one key never interleave
        let tmp = path.with_extension(format!("tmp-{}", Uuid::new_v4()));
        write_json(&tmp, &entry).await?;
        fs::rename(&tmp, &path)
            .await
            .map_err(|e| ProxyError::io(format!("committing {}", path.display()), e))?;

        debug!("Stored {} in bucket {}", entry.key, bucket);
        Ok(())
    }

    async fn put_all(&self, bucket: &str, entries: Vec<CachedEntry>) -> ProxyResult<()> {
        fs::create_dir_all(&self.root)
            .await
            .map_err(|e| ProxyError::io(format!("creating {}", self.root.display()), e))?;

        let staging = self
            .root
            .join(format!("{}{}", STAGING_PREFIX, Uuid::new_v4()));

        if let Err(e) = self.stage(&staging, bucket, &entries).await {
            remove_quietly(&staging).await;
            return Err(e);
        }

        let target = self.bucket_dir(bucket);
        let result = if target.exists() {
            match self.carry_over(&target, &staging).await {
                Ok(()) => self.swap_in(&staging, &target, bucket).await,
                Err(e) => Err(e),
            }
        } else {
            fs::rename(&staging, &target)
                .await
                .map_err(|e| ProxyError::io(format!("committing bucket {}", bucket), e))
        };

        remove_quietly(&staging).await;
        result?;

        debug!("Committed {} entries to bucket {}", entries.len(), bucket);
        Ok(())
    }

    async fn keys(&self, bucket: &str) -> ProxyResult<Vec<CacheKey>> {
        let entries_dir = self.bucket_dir(bucket).join(ENTRIES_DIR);
        let mut dir = match fs::read_dir(&entries_dir).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => return Err(ProxyError::io(format!("listing bucket {}", bucket), e)),
        };

        let mut keys = vec![];
        while let Some(file) = dir
            .next_entry()
            .await
            .map_err(|e| ProxyError::io("reading bucket entry", e))?
        {
            let path = file.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                if let Ok(content) = fs::read_to_string(&path).await {
                    if let Ok(entry) = serde_json::from_str::<CachedEntry>(&content) {
                        keys.push(entry.key);
                    }
                }
            }
        }

        keys.sort();
        Ok(keys)
    }

    async fn delete_bucket(&self, bucket: &str) -> ProxyResult<bool> {
        match fs::remove_dir_all(self.bucket_dir(bucket)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(ProxyError::io(format!("deleting bucket {}", bucket), e)),
        }
    }

    async fn list_buckets(&self) -> ProxyResult<Vec<String>> {
        let mut dir = match fs::read_dir(&self.root).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => return Err(ProxyError::io(format!("listing {}", self.root.display()), e)),
        };

        let mut names = vec![];
        while let Some(item) = dir
            .next_entry()
            .await
            .map_err(|e| ProxyError::io("reading store directory", e))?
        {
            if item.file_name().to_string_lossy().starts_with(STAGING_PREFIX) {
                continue;
            }
            let meta_path = item.path().join(BUCKET_META);
            match fs::read_to_string(&meta_path).await {
                Ok(content) => match serde_json::from_str::<BucketMeta>(&content) {
                    Ok(meta) => names.push(meta.name),
                    Err(e) => {
                        warn!("Skipping bucket with bad metadata {}: {}", meta_path.display(), e)
                    }
                },
                Err(_) => continue,
            }
        }

        names.sort();
        Ok(names)
    }

    fn backend_name(&self) -> &'static str {
        "disk"
    }
}

/// First 16 bytes of the SHA256 digest, hex-encoded
fn digest(value: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.as_bytes());
    hex::encode(&hasher.finalize()[..16])
}

async fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> ProxyResult<()> {
    let content = serde_json::to_vec(value)?;
    fs::write(path, content)
        .await
        .map_err(|e| ProxyError::io(format!("writing {}", path.display()), e))
}

async fn remove_quietly(path: &Path) {
    if let Err(e) = fs::remove_dir_all(path).await {
        if e.kind() != ErrorKind::NotFound {
            warn!("Failed to remove {}: {}", path.display(), e);
        }
    }
}
