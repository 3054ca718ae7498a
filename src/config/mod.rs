//! Configuration management for the cache proxy

pub mod schema;

pub use schema::Config;

use crate::error::{ProxyError, ProxyResult};
use crate::http::Url;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Configuration manager
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new config manager with default path
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    /// Create a config manager with a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("commute-cache")
            .join("config.toml")
    }

    /// Get the state directory path
    pub fn state_dir() -> PathBuf {
        dirs::state_dir()
            .or_else(dirs::data_local_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("commute-cache")
    }

    /// Get the default bucket store directory
    pub fn buckets_dir() -> PathBuf {
        Self::state_dir().join("buckets")
    }

    /// Get the registration record path
    pub fn registration_path() -> PathBuf {
        Self::state_dir().join("registration.json")
    }

    /// Get the lifecycle journal path
    pub fn journal_path() -> PathBuf {
        Self::state_dir().join("journal.log")
    }

    /// Load configuration, creating default if not exists
    pub async fn load(&self) -> ProxyResult<Config> {
        if !self.config_path.exists() {
            debug!("Config file not found, using defaults");
            return Ok(Config::default());
        }

        self.load_from_file(&self.config_path).await
    }

    /// Load and validate configuration from a specific file
    pub async fn load_from_file(&self, path: &Path) -> ProxyResult<Config> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| ProxyError::io(format!("reading config from {}", path.display()), e))?;

        let config: Config = toml::from_str(&content).map_err(|e| ProxyError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        validate(&config).map_err(|reason| ProxyError::ConfigInvalid {
            path: path.to_path_buf(),
            reason,
        })?;

        Ok(config)
    }

    /// Save configuration to file
    pub async fn save(&self, config: &Config) -> ProxyResult<()> {
        self.ensure_config_dir().await?;

        let content = toml::to_string_pretty(config)?;
        fs::write(&self.config_path, content).await.map_err(|e| {
            ProxyError::io(
                format!("writing config to {}", self.config_path.display()),
                e,
            )
        })?;

        info!("Configuration saved to {}", self.config_path.display());
        Ok(())
    }

    /// Ensure the config directory exists
    async fn ensure_config_dir(&self) -> ProxyResult<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| ProxyError::ConfigDirCreate {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }
        Ok(())
    }

    /// Ensure all state directories exist
    pub async fn ensure_state_dirs() -> ProxyResult<()> {
        for dir in [Self::state_dir(), Self::buckets_dir()] {
            fs::create_dir_all(&dir).await.map_err(|e| {
                ProxyError::io(format!("creating directory {}", dir.display()), e)
            })?;
        }
        Ok(())
    }

    /// Get the config file path
    pub fn path(&self) -> &Path {
        &self.config_path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Check values serde cannot check on its own
pub fn validate(config: &Config) -> Result<(), String> {
    let proxy = &config.proxy;

    if proxy.version_tag.trim().is_empty() {
        return Err("proxy.version_tag must not be empty".to_string());
    }
    if !proxy.api_prefix.starts_with('/') {
        return Err(format!(
            "proxy.api_prefix must start with '/', got '{}'",
            proxy.api_prefix
        ));
    }
    if let Err(e) = Url::parse(&proxy.origin) {
        return Err(format!("proxy.origin: {}", e));
    }
    match config.store.backend.as_str() {
        "disk" | "memory" => {}
        other => {
            return Err(format!(
                "store.backend must be 'disk' or 'memory', got '{}'",
                other
            ))
        }
    }
    match config.general.log_format.as_str() {
        "text" | "json" => {}
        other => {
            return Err(format!(
                "general.log_format must be 'text' or 'json', got '{}'",
                other
            ))
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn load_default_when_missing() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nonexistent.toml");
        let manager = ConfigManager::with_path(path);

        let config = manager.load().await.unwrap();
        assert_eq!(config.proxy.version_tag, "commute-tracker-v1");
    }

    #[tokio::test]
    async fn save_and_load_roundtrip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        let manager = ConfigManager::with_path(path);

        let mut config = Config::default();
        config.proxy.version_tag = "commute-tracker-v7".to_string();

        manager.save(&config).await.unwrap();
        let loaded = manager.load().await.unwrap();

        assert_eq!(loaded.proxy.version_tag, "commute-tracker-v7");
    }

    #[tokio::test]
    async fn load_rejects_invalid_values() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        tokio::fs::write(&path, "[proxy]\napi_prefix = \"api\"\n")
            .await
            .unwrap();

        let err = ConfigManager::with_path(path).load().await.unwrap_err();
        assert!(matches!(err, ProxyError::ConfigInvalid { .. }));
        assert!(err.to_string().contains("api_prefix"));
    }

    #[test]
    fn validate_checks_origin_and_backend() {
        let mut config = Config::default();
        assert!(validate(&config).is_ok());

        config.proxy.origin = "localhost:8000".to_string();
        assert!(validate(&config).is_err());

        config = Config::default();
        config.store.backend = "redis".to_string();
        assert!(validate(&config).unwrap_err().contains("store.backend"));

        config = Config::default();
        config.proxy.version_tag = "  ".to_string();
        assert!(validate(&config).is_err());
    }
}
