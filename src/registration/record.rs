//! Registration record persistence

use crate::error::{ProxyError, ProxyResult};
use crate::proxy::WorkerState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::fs;
use uuid::Uuid;

/// The registered worker for one version tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationRecord {
    /// Unique registration ID
    pub id: Uuid,

    /// Version tag this worker was built for
    pub version_tag: String,

    /// Last settled lifecycle state
    pub state: WorkerState,

    /// When install last succeeded
    pub installed_at: Option<DateTime<Utc>>,

    /// When activation last succeeded
    pub activated_at: Option<DateTime<Utc>>,

    /// When the record was last written
    pub updated_at: DateTime<Utc>,
}

impl RegistrationRecord {
    /// A freshly parsed worker for `version_tag`
    pub fn new(version_tag: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            version_tag: version_tag.into(),
            state: WorkerState::Parsed,
            installed_at: None,
            activated_at: None,
            updated_at: Utc::now(),
        }
    }

    /// Record a successful install that left the worker in `state`
    pub fn record_install(&mut self, state: WorkerState) {
        let now = Utc::now();
        self.installed_at = Some(now);
        if state == WorkerState::Active && self.state != WorkerState::Active {
            self.activated_at = Some(now);
        }
        self.state = state;
        self.updated_at = now;
    }

    /// Record that the worker is now in `state`
    pub fn record_state(&mut self, state: WorkerState) {
        let now = Utc::now();
        if state == WorkerState::Active && self.state != WorkerState::Active {
            self.activated_at = Some(now);
        }
        self.state = state;
        self.updated_at = now;
    }

    /// Load from `path`, `None` if it does not exist
    pub async fn load(path: &Path) -> ProxyResult<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(path).await.map_err(|e| {
            ProxyError::io(format!("reading registration {}", path.display()), e)
        })?;

        let record: Self = serde_json::from_str(&content)?;
        Ok(Some(record))
    }

    /// Write to `path`, creating parent directories
    pub async fn save(&self, path: &Path) -> ProxyResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| ProxyError::io("creating state directory", e))?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).await.map_err(|e| {
            ProxyError::io(format!("writing registration {}", path.display()), e)
        })?;

        Ok(())
    }
}
