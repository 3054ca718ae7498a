//! Configuration schema for the cache proxy
//!
//! Configuration is stored at `~/.config/commute-cache/config.toml`

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Versioning and routing
    pub proxy: ProxyConfig,

    /// Install-time asset list
    pub manifest: ManifestConfig,

    /// Push notification rendering
    pub notification: NotificationConfig,

    /// Bucket storage backend
    pub store: StoreConfig,

    /// Background sync
    pub sync: SyncConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Enable verbose logging
    pub verbose: bool,

    /// Log format: "text" or "json"
    pub log_format: String,

    /// Record lifecycle events to the journal
    pub journal: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            log_format: "text".to_string(),
            journal: true,
        }
    }
}

/// Versioning and request routing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Bucket name for this generation; change it whenever the manifest changes
    pub version_tag: String,

    /// Origin the application shell is served from
    pub origin: String,

    /// Paths under this prefix are network-first
    pub api_prefix: String,

    /// Shell document served when a navigation fails offline
    pub shell_path: String,

    /// Activate straight after a successful install
    pub skip_waiting_on_install: bool,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            version_tag: "commute-tracker-v1".to_string(),
            origin: "http://localhost:8000".to_string(),
            api_prefix: "/api/".to_string(),
            shell_path: "/static/index.html".to_string(),
            skip_waiting_on_install: true,
        }
    }
}

/// Install-time asset list
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ManifestConfig {
    /// URLs, relative to the origin or absolute
    pub urls: Vec<String>,
}

impl Default for ManifestConfig {
    fn default() -> Self {
        Self {
            urls: [
                "/static/index.html",
                "/static/main.js",
                "/static/user.js",
                "/static/utils.js",
                "/static/record.js",
                "/static/history.js",
                "/static/analysis.js",
                "/static/manifest.json",
                "https://cdn.tailwindcss.com",
                "https://cdnjs.cloudflare.com/ajax/libs/font-awesome/6.4.0/css/all.min.css",
                "https://cdn.jsdelivr.net/npm/echarts@5.4.3/dist/echarts.min.js",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

/// Push notification rendering
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// Fixed notification title
    pub title: String,

    /// Body used when the push carries no payload
    pub default_body: String,

    pub icon: String,

    pub badge: String,

    /// Vibration pattern in milliseconds
    pub vibrate: Vec<u32>,

    /// Notifications sharing a tag replace each other
    pub tag: String,

    pub require_interaction: bool,

    /// Page focused or opened on notification click
    pub open_path: String,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            title: "Commute Tracker".to_string(),
            default_body: "You have a new commute reminder".to_string(),
            icon: "/static/icon-192.png".to_string(),
            badge: "/static/badge-72.png".to_string(),
            vibrate: vec![200, 100, 200],
            tag: "commute-notification".to_string(),
            require_interaction: false,
            open_path: "/static/index.html".to_string(),
        }
    }
}

/// Bucket storage settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Backend: "disk" or "memory"
    pub backend: String,

    /// Directory for the disk backend (default: state dir)
    pub dir: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: "disk".to_string(),
            dir: None,
        }
    }
}

/// Background sync settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Sync tags the proxy acknowledges
    pub tags: Vec<String>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            tags: vec!["sync-records".to_string()],
        }
    }
}
