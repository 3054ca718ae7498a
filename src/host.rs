//! Terminal stand-ins for the page environment
//!
//! A CLI invocation has no browser pages and no notification tray, so
//! notifications and client actions are printed instead.

use crate::dispatcher::Host;
use crate::error::ProxyResult;
use crate::http::Url;
use crate::notify::{ClientAction, ClientHub, NotificationOptions, Notifier};
use crate::ui::{self, UiContext};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Prints notifications and page actions to the terminal
pub struct ConsoleHost {
    ctx: UiContext,
}

impl ConsoleHost {
    pub fn new(ctx: UiContext) -> Self {
        Self { ctx }
    }

    /// Wrap into the services the dispatcher expects
    pub fn into_host(self) -> Host {
        let host = Arc::new(self);
        Host {
            notifier: host.clone(),
            clients: host,
        }
    }
}

/// Notification body plus the rendering details as dim lines
pub fn render_notification(notification: &NotificationOptions) -> String {
    let vibrate = notification
        .vibrate
        .iter()
        .map(|ms| ms.to_string())
        .collect::<Vec<_>>()
        .join("/");

    format!(
        "{}\n\ntag: {}  icon: {}  badge: {}  vibrate: {}ms",
        notification.body, notification.tag, notification.icon, notification.badge, vibrate
    )
}

#[async_trait]
impl Notifier for ConsoleHost {
    async fn show(&self, notification: &NotificationOptions) -> ProxyResult<()> {
        ui::note(&self.ctx, &notification.title, &render_notification(notification));
        Ok(())
    }

    async fn close(&self, tag: &str) -> ProxyResult<()> {
        debug!("Closing notification {}", tag);
        ui::step_info(&self.ctx, &format!("Closed notification '{}'", tag));
        Ok(())
    }
}

#[async_trait]
impl ClientHub for ConsoleHost {
    async fn claim(&self) -> ProxyResult<usize> {
        // No pages exist outside a browser
        Ok(0)
    }

    async fn focus_or_open(&self, url: &Url) -> ProxyResult<ClientAction> {
        ui::step_info(&self.ctx, &format!("Opening {}", url));
        Ok(ClientAction::Opened)
    }
}
