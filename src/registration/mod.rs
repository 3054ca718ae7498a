//! Persisted worker registration
//!
//! The CLI runs one event per invocation, so the worker's lifecycle state
//! is kept in `<state dir>/registration.json` between runs.

mod record;

pub use record::RegistrationRecord;

use crate::config::ConfigManager;
use crate::error::ProxyResult;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Loads and saves the registration record
pub struct Registry {
    path: PathBuf,
}

impl Registry {
    /// Registry at the default state path
    pub fn new() -> Self {
        Self::with_path(ConfigManager::registration_path())
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored record, whatever version it belongs to
    pub async fn current(&self) -> ProxyResult<Option<RegistrationRecord>> {
        RegistrationRecord::load(&self.path).await
    }

    /// Record for `version_tag`.
    ///
    /// A stored record for another version describes a different worker,
    /// so a fresh one is returned instead.
    pub async fn load_for(&self, version_tag: &str) -> ProxyResult<RegistrationRecord> {
        match self.current().await? {
            Some(record) if record.version_tag == version_tag => {
                debug!("Resuming {} in state {}", version_tag, record.state);
                Ok(record)
            }
            Some(record) => {
                info!(
                    "New version {} replaces registered {}",
                    version_tag, record.version_tag
                );
                Ok(RegistrationRecord::new(version_tag))
            }
            None => Ok(RegistrationRecord::new(version_tag)),
        }
    }

    pub async fn save(&self, record: &RegistrationRecord) -> ProxyResult<()> {
        record.save(&self.path).await
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}
