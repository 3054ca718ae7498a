//! One handler per event kind

use super::{Event, EventHandler, EventOutcome};
use crate::config::schema::NotificationConfig;
use crate::error::ProxyResult;
use crate::http::Url;
use crate::journal::{self, Journal};
use crate::messages::{ControlMessage, MessageEvent, Reply};
use crate::notify::{ClientHub, NotificationOptions, Notifier};
use crate::proxy::{ActivationReport, CacheProxy};
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

async fn record_activation(journal: &Journal, proxy: &CacheProxy, report: &ActivationReport) {
    journal
        .record(
            journal::ACTIVATE_COMPLETED,
            json!({
                "version": proxy.bucket(),
                "deleted": report.deleted,
                "claimed": report.claimed,
            }),
        )
        .await;
}

pub(super) struct InstallHandler {
    proxy: Arc<CacheProxy>,
    journal: Arc<Journal>,
}

impl InstallHandler {
    pub(super) fn new(proxy: Arc<CacheProxy>, journal: Arc<Journal>) -> Self {
        Self { proxy, journal }
    }
}

#[async_trait]
impl EventHandler for InstallHandler {
    async fn handle(&self, event: Event) -> ProxyResult<EventOutcome> {
        let Event::Install(progress) = event else {
            return Ok(EventOutcome::Ignored);
        };

        let result = match progress {
            Some(on_fetched) => self.proxy.install_with_progress(on_fetched.as_ref()).await,
            None => self.proxy.install().await,
        };

        match result {
            Ok(report) => {
                self.journal
                    .record(
                        journal::INSTALL_COMPLETED,
                        json!({
                            "version": self.proxy.bucket(),
                            "cached": report.cached,
                        }),
                    )
                    .await;
                if let Some(activation) = &report.activated {
                    record_activation(&self.journal, &self.proxy, activation).await;
                }
                Ok(EventOutcome::Installed(report))
            }
            Err(e) => {
                self.journal
                    .record(
                        journal::INSTALL_FAILED,
                        json!({
                            "version": self.proxy.bucket(),
                            "error": e.to_string(),
                        }),
                    )
                    .await;
                Err(e)
            }
        }
    }
}

pub(super) struct ActivateHandler {
    proxy: Arc<CacheProxy>,
    journal: Arc<Journal>,
}

impl ActivateHandler {
    pub(super) fn new(proxy: Arc<CacheProxy>, journal: Arc<Journal>) -> Self {
        Self { proxy, journal }
    }
}

#[async_trait]
impl EventHandler for ActivateHandler {
    async fn handle(&self, event: Event) -> ProxyResult<EventOutcome> {
        let Event::Activate = event else {
            return Ok(EventOutcome::Ignored);
        };

        let report = self.proxy.activate().await?;
        record_activation(&self.journal, &self.proxy, &report).await;
        Ok(EventOutcome::Activated(report))
    }
}

pub(super) struct FetchHandler {
    proxy: Arc<CacheProxy>,
}

impl FetchHandler {
    pub(super) fn new(proxy: Arc<CacheProxy>) -> Self {
        Self { proxy }
    }
}

#[async_trait]
impl EventHandler for FetchHandler {
    async fn handle(&self, event: Event) -> ProxyResult<EventOutcome> {
        let Event::Fetch(request) = event else {
            return Ok(EventOutcome::Ignored);
        };
        let outcome = self.proxy.handle_fetch(&request).await?;
        Ok(EventOutcome::Fetched(outcome))
    }
}

pub(super) struct MessageHandler {
    proxy: Arc<CacheProxy>,
    journal: Arc<Journal>,
}

impl MessageHandler {
    pub(super) fn new(proxy: Arc<CacheProxy>, journal: Arc<Journal>) -> Self {
        Self { proxy, journal }
    }

    async fn clear_cache(&self, event: MessageEvent) -> ProxyResult<EventOutcome> {
        // On failure the port is dropped unanswered
        let buckets = self.proxy.clear_all().await?;
        self.journal
            .record(journal::CACHE_CLEARED, json!({ "buckets": buckets }))
            .await;

        let replied = match event.reply {
            Some(port) => {
                let delivered = port.send(Reply { success: true });
                if !delivered {
                    warn!("Cache cleared but the sender stopped listening");
                }
                delivered
            }
            None => {
                warn!("Cache cleared but the message carried no reply port");
                false
            }
        };

        Ok(EventOutcome::CacheCleared { buckets, replied })
    }
}

#[async_trait]
impl EventHandler for MessageHandler {
    async fn handle(&self, event: Event) -> ProxyResult<EventOutcome> {
        let Event::Message(message) = event else {
            return Ok(EventOutcome::Ignored);
        };

        match ControlMessage::parse(&message.data) {
            Some(ControlMessage::SkipWaiting) => {
                let report = self.proxy.skip_waiting().await?;
                if let Some(report) = &report {
                    record_activation(&self.journal, &self.proxy, report).await;
                }
                Ok(EventOutcome::SkippedWaiting(report))
            }
            Some(ControlMessage::ClearCache) => self.clear_cache(message).await,
            None => Ok(EventOutcome::Ignored),
        }
    }
}

pub(super) struct PushHandler {
    notifier: Arc<dyn Notifier>,
    config: NotificationConfig,
}

impl PushHandler {
    pub(super) fn new(notifier: Arc<dyn Notifier>, config: NotificationConfig) -> Self {
        Self { notifier, config }
    }
}

#[async_trait]
impl EventHandler for PushHandler {
    async fn handle(&self, event: Event) -> ProxyResult<EventOutcome> {
        let Event::Push(payload) = event else {
            return Ok(EventOutcome::Ignored);
        };

        let notification = NotificationOptions::for_push(&self.config, payload.as_deref());
        self.notifier.show(&notification).await?;
        Ok(EventOutcome::Notified(notification))
    }
}

pub(super) struct ClickHandler {
    notifier: Arc<dyn Notifier>,
    clients: Arc<dyn ClientHub>,
    open_url: Url,
}

impl ClickHandler {
    pub(super) fn new(
        notifier: Arc<dyn Notifier>,
        clients: Arc<dyn ClientHub>,
        open_url: Url,
    ) -> Self {
        Self {
            notifier,
            clients,
            open_url,
        }
    }
}

#[async_trait]
impl EventHandler for ClickHandler {
    async fn handle(&self, event: Event) -> ProxyResult<EventOutcome> {
        let Event::NotificationClick(tag) = event else {
            return Ok(EventOutcome::Ignored);
        };

        if let Err(e) = self.notifier.close(&tag).await {
            warn!("Failed to close notification {}: {}", tag, e);
        }
        let action = self.clients.focus_or_open(&self.open_url).await?;
        Ok(EventOutcome::ClientShown(action))
    }
}

pub(super) struct SyncHandler {
    tags: Vec<String>,
}

impl SyncHandler {
    pub(super) fn new(tags: Vec<String>) -> Self {
        Self { tags }
    }
}

#[async_trait]
impl EventHandler for SyncHandler {
    async fn handle(&self, event: Event) -> ProxyResult<EventOutcome> {
        let Event::Sync(tag) = event else {
            return Ok(EventOutcome::Ignored);
        };

        if self.tags.contains(&tag) {
            info!("Background sync completed: {}", tag);
            Ok(EventOutcome::Synced(tag))
        } else {
            Ok(EventOutcome::Ignored)
        }
    }
}
