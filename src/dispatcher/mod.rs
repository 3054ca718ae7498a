//! Explicit event dispatch
//!
//! The hosting environment delivers lifecycle, fetch, message, push,
//! notification-click and sync events. Each kind maps to exactly one
//! handler in a table built once by [`Dispatcher::new`]; tests and the CLI
//! call [`Dispatcher::dispatch`] directly.

mod handlers;

use crate::config::Config;
use crate::error::{ProxyError, ProxyResult};
use crate::http::{Request, Url};
use crate::journal::Journal;
use crate::messages::MessageEvent;
use crate::notify::{ClientAction, ClientHub, NotificationOptions, Notifier};
use crate::proxy::{ActivationReport, CacheProxy, FetchOutcome, InstallReport};
use async_trait::async_trait;
use handlers::{
    ActivateHandler, ClickHandler, FetchHandler, InstallHandler, MessageHandler, PushHandler,
    SyncHandler,
};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Callback invoked as each manifest entry is fetched during install
pub type InstallProgress = Arc<dyn Fn(&Url) + Send + Sync>;

/// Discriminant of [`Event`], used as the dispatch key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Install,
    Activate,
    Fetch,
    Message,
    Push,
    NotificationClick,
    Sync,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Install => "install",
            Self::Activate => "activate",
            Self::Fetch => "fetch",
            Self::Message => "message",
            Self::Push => "push",
            Self::NotificationClick => "notificationclick",
            Self::Sync => "sync",
        };
        f.write_str(name)
    }
}

/// An event delivered by the host
pub enum Event {
    Install(Option<InstallProgress>),
    Activate,
    Fetch(Request),
    Message(MessageEvent),
    /// Push with its optional text payload
    Push(Option<String>),
    /// Click on the notification with this tag
    NotificationClick(String),
    /// Background sync for this tag
    Sync(String),
}

impl Event {
    pub fn install() -> Self {
        Self::Install(None)
    }

    pub fn kind(&self) -> EventKind {
        match self {
            Self::Install(_) => EventKind::Install,
            Self::Activate => EventKind::Activate,
            Self::Fetch(_) => EventKind::Fetch,
            Self::Message(_) => EventKind::Message,
            Self::Push(_) => EventKind::Push,
            Self::NotificationClick(_) => EventKind::NotificationClick,
            Self::Sync(_) => EventKind::Sync,
        }
    }
}

/// What handling an event produced
#[derive(Debug)]
pub enum EventOutcome {
    Installed(InstallReport),
    Activated(ActivationReport),
    Fetched(FetchOutcome),
    /// `SKIP_WAITING` handled, with the activation it triggered if any
    SkippedWaiting(Option<ActivationReport>),
    /// `CLEAR_CACHE` handled
    CacheCleared { buckets: usize, replied: bool },
    Notified(NotificationOptions),
    ClientShown(ClientAction),
    Synced(String),
    /// Not addressed to this proxy
    Ignored,
    Failed(ProxyError),
}

impl EventOutcome {
    /// Unwrap a fetch result for callers that only dispatch fetches
    pub fn into_fetch(self) -> ProxyResult<FetchOutcome> {
        match self {
            Self::Fetched(outcome) => Ok(outcome),
            Self::Failed(e) => Err(e),
            other => Err(ProxyError::Internal(format!(
                "fetch produced {:?}",
                other
            ))),
        }
    }

    /// Turn `Failed` back into an error, keeping every other outcome
    pub fn into_result(self) -> ProxyResult<Self> {
        match self {
            Self::Failed(e) => Err(e),
            other => Ok(other),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Handles one kind of event
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, event: Event) -> ProxyResult<EventOutcome>;
}

/// Page-side services provided by the host
#[derive(Clone)]
pub struct Host {
    pub notifier: Arc<dyn Notifier>,
    pub clients: Arc<dyn ClientHub>,
}

/// Routes each event to the handler registered for its kind
pub struct Dispatcher {
    proxy: Arc<CacheProxy>,
    handlers: HashMap<EventKind, Arc<dyn EventHandler>>,
}

impl Dispatcher {
    /// Build the full handler table.
    ///
    /// `host.clients` should be the same hub the proxy claims through.
    pub fn new(proxy: Arc<CacheProxy>, host: Host, config: &Config, journal: Journal) -> Self {
        let journal = Arc::new(journal);
        let open_url = proxy
            .settings()
            .origin
            .join(&config.notification.open_path)
            .unwrap_or_else(|_| proxy.settings().shell_url.clone());

        let mut handlers: HashMap<EventKind, Arc<dyn EventHandler>> = HashMap::new();
        handlers.insert(
            EventKind::Install,
            Arc::new(InstallHandler::new(proxy.clone(), journal.clone())),
        );
        handlers.insert(
            EventKind::Activate,
            Arc::new(ActivateHandler::new(proxy.clone(), journal.clone())),
        );
        handlers.insert(EventKind::Fetch, Arc::new(FetchHandler::new(proxy.clone())));
        handlers.insert(
            EventKind::Message,
            Arc::new(MessageHandler::new(proxy.clone(), journal)),
        );
        handlers.insert(
            EventKind::Push,
            Arc::new(PushHandler::new(
                host.notifier.clone(),
                config.notification.clone(),
            )),
        );
        handlers.insert(
            EventKind::NotificationClick,
            Arc::new(ClickHandler::new(host.notifier, host.clients, open_url)),
        );
        handlers.insert(
            EventKind::Sync,
            Arc::new(SyncHandler::new(config.sync.tags.clone())),
        );

        Self { proxy, handlers }
    }

    pub fn proxy(&self) -> &Arc<CacheProxy> {
        &self.proxy
    }

    /// Run the handler for `event` to completion.
    ///
    /// Handler errors are logged and returned as [`EventOutcome::Failed`].
    pub async fn dispatch(&self, event: Event) -> EventOutcome {
        let kind = event.kind();
        let Some(handler) = self.handlers.get(&kind) else {
            debug!("No handler for {} event", kind);
            return EventOutcome::Ignored;
        };

        debug!("Dispatching {} event", kind);
        match handler.handle(event).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("{} handler failed: {}", kind, e);
                EventOutcome::Failed(e)
            }
        }
    }

    /// Dispatch a fetch and unwrap its result
    pub async fn fetch(&self, request: Request) -> ProxyResult<FetchOutcome> {
        self.dispatch(Event::Fetch(request)).await.into_fetch()
    }
}
