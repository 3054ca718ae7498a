//! Network access for the proxy
//!
//! The proxy reaches the network only through a [`Fetcher`], so tests can
//! script outages and responses. Any HTTP status counts as a successful
//! fetch; only transport failures (DNS, refused, reset, TLS) are errors.

use crate::error::{ProxyError, ProxyResult};
use crate::http::{Method, Request, RequestMode, Response, ResponseKind, Url};
use async_trait::async_trait;
use tracing::debug;
use ureq::http::HeaderValue;
use ureq::Agent;

/// Outbound network interface
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Perform the request against the network
    async fn fetch(&self, request: &Request) -> ProxyResult<Response>;
}

/// Fetcher backed by a blocking `ureq` agent
#[derive(Clone)]
pub struct HttpFetcher {
    agent: Agent,
    origin: Url,
}

impl HttpFetcher {
    /// Create a fetcher for pages served from `origin`
    pub fn new(origin: Url) -> Self {
        let config = Agent::config_builder()
            .http_status_as_error(false)
            .build();
        Self {
            agent: Agent::new_with_config(config),
            origin,
        }
    }

    fn call(agent: &Agent, request: &Request) -> Result<Response, ureq::Error> {
        let url = request.url.to_string();

        let mut response = match request.method {
            Method::Post | Method::Put | Method::Patch => {
                let mut builder = match request.method {
                    Method::Post => agent.post(&url),
                    Method::Put => agent.put(&url),
                    _ => agent.patch(&url),
                };
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                match request.body {
                    Some(ref body) => builder.send(&body[..])?,
                    None => builder.send_empty()?,
                }
            }
            _ => {
                let mut builder = match request.method {
                    Method::Head => agent.head(&url),
                    Method::Delete => agent.delete(&url),
                    Method::Options => agent.options(&url),
                    _ => agent.get(&url),
                };
                for (name, value) in &request.headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                builder.call()?
            }
        };

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| (name.as_str().to_string(), header_text(value)))
            .collect();
        let body = response.body_mut().read_to_vec()?;

        Ok(Response {
            status,
            headers,
            body,
            kind: ResponseKind::Basic,
            url,
        })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, request: &Request) -> ProxyResult<Response> {
        let agent = self.agent.clone();
        let owned = request.clone();

        let result = tokio::task::spawn_blocking(move || Self::call(&agent, &owned))
            .await
            .map_err(|e| ProxyError::Internal(format!("Fetch task failed: {}", e)))?;

        let response =
            result.map_err(|e| ProxyError::network(request.url.to_string(), e.to_string()))?;
        let kind = response_kind(&self.origin, request);
        debug!("{} -> {} ({:?})", request, response.status, kind);

        Ok(response.with_kind(kind))
    }
}

/// Header value as text; bytes outside ASCII are kept lossily
fn header_text(value: &HeaderValue) -> String {
    String::from_utf8_lossy(value.as_bytes()).into_owned()
}

/// How a response to `request` is exposed to a page served from `origin`
pub fn response_kind(origin: &Url, request: &Request) -> ResponseKind {
    if request.url.same_origin(origin) {
        ResponseKind::Basic
    } else if request.mode == RequestMode::NoCors {
        ResponseKind::Opaque
    } else {
        ResponseKind::Cors
    }
}
