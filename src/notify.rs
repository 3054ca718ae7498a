//! Push notifications and page clients
//!
//! The proxy holds no notification state of its own: a push renders one
//! notification through the injected [`Notifier`], a click closes it and
//! brings the app's page forward through the injected [`ClientHub`].

use crate::config::schema::NotificationConfig;
use crate::error::ProxyResult;
use crate::http::Url;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A notification ready to display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationOptions {
    pub title: String,
    pub body: String,
    pub icon: String,
    pub badge: String,
    pub vibrate: Vec<u32>,
    pub tag: String,
    pub require_interaction: bool,
}

impl NotificationOptions {
    /// Render a push with an optional text payload.
    ///
    /// A missing payload falls back to the configured default body; a
    /// present-but-empty payload is shown as-is.
    pub fn for_push(config: &NotificationConfig, payload: Option<&str>) -> Self {
        Self {
            title: config.title.clone(),
            body: payload
                .map(str::to_string)
                .unwrap_or_else(|| config.default_body.clone()),
            icon: config.icon.clone(),
            badge: config.badge.clone(),
            vibrate: config.vibrate.clone(),
            tag: config.tag.clone(),
            require_interaction: config.require_interaction,
        }
    }
}

/// Displays and dismisses user notifications
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn show(&self, notification: &NotificationOptions) -> ProxyResult<()>;

    /// Dismiss the notification with `tag`
    async fn close(&self, tag: &str) -> ProxyResult<()>;
}

/// What happened to the page on notification click
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientAction {
    /// An open page was brought to the front
    Focused,
    /// No page was open; a new one was opened
    Opened,
}

/// Open application pages controlled by the proxy
#[async_trait]
pub trait ClientHub: Send + Sync {
    /// Take control of every open page without a reload.
    ///
    /// Returns the number of pages claimed.
    async fn claim(&self) -> ProxyResult<usize>;

    /// Focus a page showing `url`, or open one
    async fn focus_or_open(&self, url: &Url) -> ProxyResult<ClientAction>;
}
