//! Network-first and cache-first request policies

use super::{CacheProxy, FetchOutcome, ResponseSource};
use crate::error::ProxyResult;
use crate::http::{CacheKey, Request, Response};
use crate::store::CachedEntry;
use tracing::{debug, warn};

impl CacheProxy {
    /// Live network response wins; the cached copy only covers outages.
    pub(super) async fn network_first(&self, request: &Request) -> ProxyResult<FetchOutcome> {
        let key = request.cache_key();

        match self.fetcher.fetch(request).await {
            Ok(response) => {
                match key {
                    Some(key) => self.store_quietly(key, &response).await,
                    None => debug!("Not caching {}: only GET is stored", request),
                }
                Ok(FetchOutcome::new(response, ResponseSource::Network))
            }
            Err(e) => {
                debug!("Network failed for {}, trying cache: {}", request, e);
                match self.lookup(key.as_ref()).await {
                    Some(entry) => Ok(FetchOutcome::new(entry.response, ResponseSource::Cache)),
                    None => Err(e),
                }
            }
        }
    }

    /// Cached copy wins; misses go to the network and qualifying responses
    /// are stored for next time.
    pub(super) async fn cache_first(&self, request: &Request) -> ProxyResult<FetchOutcome> {
        let key = request.cache_key();

        if let Some(entry) = self.lookup(key.as_ref()).await {
            debug!("Serving from cache: {}", request.url);
            return Ok(FetchOutcome::new(entry.response, ResponseSource::Cache));
        }

        debug!("Fetching from network: {}", request.url);
        match self.fetcher.fetch(request).await {
            Ok(response) => {
                if let Some(key) = key.filter(|_| response.is_cacheable_static()) {
                    self.store_quietly(key, &response).await;
                }
                Ok(FetchOutcome::new(response, ResponseSource::Network))
            }
            Err(e) if request.is_navigation() => {
                warn!("Navigation to {} failed, serving shell: {}", request.url, e);
                let shell = CacheKey::for_url(&self.settings.shell_url);
                match self.lookup(Some(&shell)).await {
                    Some(entry) => Ok(FetchOutcome::new(
                        entry.response,
                        ResponseSource::ShellFallback,
                    )),
                    None => Err(e),
                }
            }
            Err(e) => Err(e),
        }
    }

    /// Read from the current bucket; storage errors count as a miss
    async fn lookup(&self, key: Option<&CacheKey>) -> Option<CachedEntry> {
        let key = key?;
        match self.store.get(self.bucket(), key).await {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Cache read failed for {}: {}", key, e);
                None
            }
        }
    }

    /// Write a copy of `response`; failures never reach the caller
    async fn store_quietly(&self, key: CacheKey, response: &Response) {
        let entry = CachedEntry::new(key, response.clone());
        if let Err(e) = self.store.put(self.bucket(), entry).await {
            warn!("Cache write failed: {}", e);
        }
    }
}
