//! Error types for the cache proxy
//!
//! All modules use `ProxyResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for proxy operations
pub type ProxyResult<T> = Result<T, ProxyError>;

/// All errors that can occur in the cache proxy
#[derive(Error, Debug)]
pub enum ProxyError {
    // Lifecycle errors
    #[error("Install failed while fetching {url}: {reason}")]
    InstallFailed { url: String, reason: String },

    #[error("Activation failed: {0}")]
    ActivationFailed(String),

    #[error("Invalid lifecycle transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Invalid manifest: {0}")]
    ManifestInvalid(String),

    // Network errors
    #[error("Network request to {url} failed: {reason}")]
    Network { url: String, reason: String },

    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    // Store errors
    #[error("Cache store error: {0}")]
    Store(String),

    #[error("Cache quota exceeded for bucket {bucket}")]
    QuotaExceeded { bucket: String },

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    User(String),
}

impl ProxyError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a network error for a URL
    pub fn network(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Network {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Create a store error
    pub fn store(reason: impl Into<String>) -> Self {
        Self::Store(reason.into())
    }

    /// Whether the failure came from the transport rather than the proxy.
    ///
    /// These are the failures a cached copy can stand in for.
    pub fn is_offline(&self) -> bool {
        matches!(self, Self::Network { .. })
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::InstallFailed { .. } => {
                Some("Check that every manifest URL is reachable, then run: commute-cache install")
            }
            Self::ActivationFailed(_) => Some("Retry with: commute-cache activate"),
            Self::Network { .. } => Some("The origin is unreachable and no cached copy exists"),
            Self::ConfigInvalid { .. } => Some("Run: commute-cache config show"),
            Self::QuotaExceeded { .. } => Some("Run: commute-cache clear-cache"),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = ProxyError::network("http://localhost/api/records", "connection refused");
        assert!(err.to_string().contains("/api/records"));
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn error_hint() {
        let err = ProxyError::ActivationFailed("disk busy".to_string());
        assert_eq!(err.hint(), Some("Retry with: commute-cache activate"));
        assert_eq!(ProxyError::Internal("x".to_string()).hint(), None);
    }

    #[test]
    fn offline_classification() {
        assert!(ProxyError::network("u", "dns").is_offline());
        assert!(!ProxyError::store("disk full").is_offline());
        assert!(!ProxyError::InstallFailed {
            url: "u".to_string(),
            reason: "status 404".to_string(),
        }
        .is_offline());
    }
}
