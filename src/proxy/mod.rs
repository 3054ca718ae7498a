//! The offline cache proxy
//!
//! Owns one bucket named by the version tag. Install pre-populates it from
//! the manifest, activation deletes every other bucket, and while active
//! each intercepted request is routed by URL shape:
//!
//! | Request | Policy | Offline behavior |
//! |---------|--------|------------------|
//! | path under the API prefix | network-first | last cached copy, else error |
//! | anything else | cache-first | shell document for navigations, else error |
//!
//! Storage, network and page clients are injected, so every policy can be
//! exercised against in-memory fakes.

mod lifecycle;
mod manifest;
mod routing;

pub use lifecycle::WorkerState;
pub use manifest::Manifest;

use crate::config::schema::ProxyConfig;
use crate::error::{ProxyError, ProxyResult};
use crate::http::{CacheKey, Request, Response, Url};
use crate::network::Fetcher;
use crate::notify::ClientHub;
use crate::store::{CacheStore, CachedEntry};
use futures_util::future::try_join_all;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Static settings of one proxy version
#[derive(Debug, Clone)]
pub struct ProxySettings {
    /// Name of the current bucket
    pub version_tag: String,
    pub origin: Url,
    pub api_prefix: String,
    /// Navigation fallback target
    pub shell_url: Url,
    pub skip_waiting_on_install: bool,
}

impl ProxySettings {
    pub fn from_config(config: &ProxyConfig) -> ProxyResult<Self> {
        let origin = Url::parse(&config.origin)?;
        let shell_url = origin.join(&config.shell_path)?;
        Ok(Self {
            version_tag: config.version_tag.clone(),
            origin,
            api_prefix: config.api_prefix.clone(),
            shell_url,
            skip_waiting_on_install: config.skip_waiting_on_install,
        })
    }
}

/// Routing policy chosen for a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    NetworkFirst,
    CacheFirst,
}

/// Where a returned response came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseSource {
    Network,
    Cache,
    /// Shell document substituted for a failed navigation
    ShellFallback,
    /// Proxy not active; request went straight to the network
    Passthrough,
}

impl fmt::Display for ResponseSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Network => "network",
            Self::Cache => "cache",
            Self::ShellFallback => "shell-fallback",
            Self::Passthrough => "passthrough",
        };
        f.write_str(name)
    }
}

/// Response handed back to the page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome {
    pub response: Response,
    pub source: ResponseSource,
}

impl FetchOutcome {
    fn new(response: Response, source: ResponseSource) -> Self {
        Self { response, source }
    }
}

/// Result of a completed install
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    /// Manifest entries committed to the bucket
    pub cached: usize,
    /// Whether install went straight on to activation
    pub activated: Option<ActivationReport>,
}

/// Result of a completed activation
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ActivationReport {
    /// Buckets from older versions that were deleted
    pub deleted: Vec<String>,
    /// Open pages taken over
    pub claimed: usize,
}

/// The cache proxy for one version tag
pub struct CacheProxy {
    settings: ProxySettings,
    manifest: Manifest,
    store: Arc<dyn CacheStore>,
    fetcher: Arc<dyn Fetcher>,
    clients: Arc<dyn ClientHub>,
    state: Mutex<WorkerState>,
    skip_waiting: AtomicBool,
}

impl CacheProxy {
    pub fn new(
        settings: ProxySettings,
        manifest: Manifest,
        store: Arc<dyn CacheStore>,
        fetcher: Arc<dyn Fetcher>,
        clients: Arc<dyn ClientHub>,
    ) -> Self {
        Self {
            settings,
            manifest,
            store,
            fetcher,
            clients,
            state: Mutex::new(WorkerState::Parsed),
            skip_waiting: AtomicBool::new(false),
        }
    }

    /// Resume from a previously recorded state.
    ///
    /// In-flight states (`installing`, `activating`) cannot be resumed and
    /// fall back to the last settled state before them.
    pub fn with_state(self, state: WorkerState) -> Self {
        let settled = match state {
            WorkerState::Installing => WorkerState::Parsed,
            WorkerState::Activating => WorkerState::Waiting,
            other => other,
        };
        Self {
            state: Mutex::new(settled),
            ..self
        }
    }

    pub fn settings(&self) -> &ProxySettings {
        &self.settings
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn store(&self) -> &Arc<dyn CacheStore> {
        &self.store
    }

    /// Name of the bucket this version owns
    pub fn bucket(&self) -> &str {
        &self.settings.version_tag
    }

    pub async fn state(&self) -> WorkerState {
        *self.state.lock().await
    }

    async fn transition(&self, next: WorkerState) -> ProxyResult<WorkerState> {
        let mut state = self.state.lock().await;
        let previous = *state;
        *state = previous.transition(next)?;
        info!("Worker {}: {} -> {}", self.settings.version_tag, previous, next);
        Ok(previous)
    }

    /// Classify a request by path
    pub fn route(&self, request: &Request) -> Route {
        if request.url.path().starts_with(&self.settings.api_prefix) {
            Route::NetworkFirst
        } else {
            Route::CacheFirst
        }
    }

    /// Install: fetch the whole manifest, then commit it in one write
    pub async fn install(&self) -> ProxyResult<InstallReport> {
        self.install_with_progress(&|_: &Url| {}).await
    }

    /// Install, calling `on_fetched` as each manifest entry arrives.
    ///
    /// Nothing is written unless every entry fetched with an OK status.
    /// A first install that fails leaves the version redundant. Re-installing
    /// a waiting or active worker refreshes the bucket in place: the worker
    /// keeps its state throughout, and a failed refresh leaves it as it was.
    pub async fn install_with_progress(
        &self,
        on_fetched: &(dyn Fn(&Url) + Send + Sync),
    ) -> ProxyResult<InstallReport> {
        let refresh = self.begin_install().await?;

        match self.populate(on_fetched).await {
            Ok(cached) => {
                if refresh.is_none() {
                    self.transition(WorkerState::Waiting).await?;
                }
                info!(
                    "Installed {} ({} entries in bucket {})",
                    self.settings.version_tag,
                    cached,
                    self.bucket()
                );

                let waiting = self.state().await == WorkerState::Waiting;
                let activated = if waiting && self.wants_skip_waiting() {
                    match self.activate().await {
                        Ok(report) => Some(report),
                        Err(e) => {
                            warn!("Install succeeded but activation failed: {}", e);
                            None
                        }
                    }
                } else {
                    None
                };

                Ok(InstallReport { cached, activated })
            }
            Err(e) => {
                match refresh {
                    Some(state) => warn!(
                        "Refresh of {} failed, staying {}: {}",
                        self.settings.version_tag, state, e
                    ),
                    None => {
                        warn!("Install of {} failed: {}", self.settings.version_tag, e);
                        self.transition(WorkerState::Redundant).await?;
                    }
                }
                Err(e)
            }
        }
    }

    /// Enter `installing`, or return the installed state being refreshed
    async fn begin_install(&self) -> ProxyResult<Option<WorkerState>> {
        let state = self.state().await;
        if state.is_installed() {
            debug!("Refreshing {} while {}", self.settings.version_tag, state);
            return Ok(Some(state));
        }
        self.transition(WorkerState::Installing).await?;
        Ok(None)
    }

    async fn populate(&self, on_fetched: &(dyn Fn(&Url) + Send + Sync)) -> ProxyResult<usize> {
        let fetches = self.manifest.requests().map(move |request| async move {
            let url = request.url.to_string();
            let response = self.fetcher.fetch(&request).await.map_err(|e| {
                ProxyError::InstallFailed {
                    url: url.clone(),
                    reason: e.to_string(),
                }
            })?;

            if !response.is_ok() {
                return Err(ProxyError::InstallFailed {
                    url,
                    reason: format!("status {}", response.status),
                });
            }

            on_fetched(&request.url);
            Ok::<_, ProxyError>(CachedEntry::new(CacheKey::for_url(&request.url), response))
        });

        let entries = try_join_all(fetches).await?;
        let count = entries.len();
        self.store.put_all(self.bucket(), entries).await?;
        Ok(count)
    }

    fn wants_skip_waiting(&self) -> bool {
        self.settings.skip_waiting_on_install || self.skip_waiting.load(Ordering::SeqCst)
    }

    /// Activate: drop every other bucket, then take control of open pages
    pub async fn activate(&self) -> ProxyResult<ActivationReport> {
        self.transition(WorkerState::Activating).await?;

        let deleted = match self.delete_stale_buckets().await {
            Ok(deleted) => deleted,
            Err(e) => {
                self.transition(WorkerState::Waiting).await?;
                return Err(e);
            }
        };

        let claimed = match self.clients.claim().await {
            Ok(n) => n,
            Err(e) => {
                warn!("Failed to claim clients: {}", e);
                0
            }
        };

        self.transition(WorkerState::Active).await?;
        self.skip_waiting.store(false, Ordering::SeqCst);

        Ok(ActivationReport { deleted, claimed })
    }

    async fn delete_stale_buckets(&self) -> ProxyResult<Vec<String>> {
        let names = self
            .store
            .list_buckets()
            .await
            .map_err(|e| ProxyError::ActivationFailed(format!("listing buckets: {}", e)))?;

        let mut deleted = vec![];
        let mut failures = vec![];
        for name in names.into_iter().filter(|n| n != self.bucket()) {
            match self.store.delete_bucket(&name).await {
                Ok(_) => {
                    info!("Deleted old bucket: {}", name);
                    deleted.push(name);
                }
                Err(e) => failures.push(format!("{}: {}", name, e)),
            }
        }

        if failures.is_empty() {
            Ok(deleted)
        } else {
            Err(ProxyError::ActivationFailed(format!(
                "could not delete {}",
                failures.join(", ")
            )))
        }
    }

    /// Request activation without waiting.
    ///
    /// Activates now when waiting; while installing, activation follows
    /// the install. Returns the activation report if one ran.
    pub async fn skip_waiting(&self) -> ProxyResult<Option<ActivationReport>> {
        self.skip_waiting.store(true, Ordering::SeqCst);

        if self.state().await == WorkerState::Waiting {
            return self.activate().await.map(Some);
        }
        let state = self.state().await;
        debug!("Skip-waiting recorded in state {}", state);
        Ok(None)
    }

    /// Delete every bucket regardless of version, returning how many existed
    pub async fn clear_all(&self) -> ProxyResult<usize> {
        let names = self.store.list_buckets().await?;
        let mut cleared = 0;
        let mut failures = vec![];

        for name in &names {
            match self.store.delete_bucket(name).await {
                Ok(true) => cleared += 1,
                Ok(false) => {}
                Err(e) => failures.push(format!("{}: {}", name, e)),
            }
        }

        if !failures.is_empty() {
            return Err(ProxyError::store(format!(
                "could not delete {}",
                failures.join(", ")
            )));
        }

        info!("Cleared {} bucket(s)", cleared);
        Ok(cleared)
    }

    /// Answer one intercepted request
    pub async fn handle_fetch(&self, request: &Request) -> ProxyResult<FetchOutcome> {
        if !self.state().await.controls_clients() {
            debug!("Not controlling pages, passing through: {}", request);
            let response = self.fetcher.fetch(request).await?;
            return Ok(FetchOutcome::new(response, ResponseSource::Passthrough));
        }

        match self.route(request) {
            Route::NetworkFirst => self.network_first(request).await,
            Route::CacheFirst => self.cache_first(request).await,
        }
    }
}
