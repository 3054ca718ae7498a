//! CLI command implementations

pub mod activate;
pub mod buckets;
pub mod config;
pub mod events;
pub mod fetch;
pub mod install;
pub mod message;
pub mod status;

pub use activate::execute as activate;
pub use buckets::execute as buckets;
pub use config::execute as config;
pub use events::{click, push, sync};
pub use fetch::execute as fetch;
pub use install::execute as install;
pub use message::{clear_cache, execute as message};
pub use status::execute as status;

use crate::config::Config;
use crate::dispatcher::Dispatcher;
use crate::error::ProxyResult;
use crate::host::ConsoleHost;
use crate::journal::Journal;
use crate::network::HttpFetcher;
use crate::proxy::{CacheProxy, Manifest, ProxySettings};
use crate::registration::{RegistrationRecord, Registry};
use crate::store::create_store;
use crate::ui::UiContext;
use std::sync::Arc;
use tracing::debug;

/// The proxy as one CLI invocation sees it: resumed from the registration
/// record, wired to the real network and the terminal
pub struct Worker {
    pub dispatcher: Dispatcher,
    pub ctx: UiContext,
    registry: Registry,
    record: RegistrationRecord,
}

impl Worker {
    pub async fn start(config: &Config, ctx: UiContext) -> ProxyResult<Self> {
        let settings = ProxySettings::from_config(&config.proxy)?;
        let manifest = Manifest::resolve(&settings.origin, &config.manifest.urls)?;
        let store = create_store(&config.store)?;
        let fetcher = Arc::new(HttpFetcher::new(settings.origin.clone()));
        let host = ConsoleHost::new(ctx.clone()).into_host();

        let registry = Registry::new();
        let record = registry.load_for(&settings.version_tag).await?;
        debug!(
            "Worker {} resumed as {} ({} store)",
            record.version_tag,
            record.state,
            store.backend_name()
        );

        let proxy = CacheProxy::new(settings, manifest, store, fetcher, host.clients.clone())
            .with_state(record.state);
        let dispatcher = Dispatcher::new(Arc::new(proxy), host, config, Journal::new(config));

        Ok(Self {
            dispatcher,
            ctx,
            registry,
            record,
        })
    }

    pub fn proxy(&self) -> &CacheProxy {
        self.dispatcher.proxy()
    }

    pub fn record(&self) -> &RegistrationRecord {
        &self.record
    }

    /// Save the proxy's current state
    pub async fn persist(&mut self) -> ProxyResult<()> {
        let state = self.proxy().state().await;
        self.record.record_state(state);
        self.registry.save(&self.record).await
    }

    /// Save the state reached by a successful install
    pub async fn persist_install(&mut self) -> ProxyResult<()> {
        let state = self.proxy().state().await;
        self.record.record_install(state);
        self.registry.save(&self.record).await
    }
}
