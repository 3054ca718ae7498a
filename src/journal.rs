//! Lifecycle journal
//!
//! Appends one JSON line per lifecycle event to `<state dir>/journal.log`.
//! Journal IO never fails the operation being recorded.

use crate::config::{schema::Config, ConfigManager};
use chrono::Utc;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::warn;

pub const INSTALL_COMPLETED: &str = "install.completed";
pub const INSTALL_FAILED: &str = "install.failed";
pub const ACTIVATE_COMPLETED: &str = "activate.completed";
pub const CACHE_CLEARED: &str = "cache.cleared";

/// Append-only JSON-lines event log
#[derive(Debug, Clone)]
pub struct Journal {
    enabled: bool,
    path: PathBuf,
}

impl Journal {
    /// Journal at the default state path, on or off per config
    pub fn new(config: &Config) -> Self {
        Self {
            enabled: config.general.journal,
            path: ConfigManager::journal_path(),
        }
    }

    /// Enabled journal writing to `path`
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            enabled: true,
            path: path.into(),
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            path: PathBuf::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record `event` with its data
    pub async fn record(&self, event: &str, data: Value) {
        if !self.enabled {
            return;
        }

        let entry = serde_json::json!({
            "timestamp": Utc::now().to_rfc3339(),
            "event": event,
            "data": data,
        });

        let mut line = match serde_json::to_string(&entry) {
            Ok(s) => s,
            Err(e) => {
                warn!("Failed to serialize journal event: {}", e);
                return;
            }
        };
        line.push('\n');

        if let Err(e) = self.append(&line).await {
            warn!("Failed to write journal {}: {}", self.path.display(), e);
        }
    }

    async fn append(&self, line: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;

        file.write_all(line.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }

    /// Read back every recorded entry, skipping unparsable lines
    pub async fn entries(&self) -> Vec<Value> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content
                .lines()
                .filter_map(|l| serde_json::from_str(l).ok())
                .collect(),
            Err(_) => vec![],
        }
    }
}
