//! In-process fakes for the injected interfaces

use crate::error::{ProxyError, ProxyResult};
use crate::http::{Request, Response, Url};
use crate::network::Fetcher;
use crate::notify::{ClientAction, ClientHub, NotificationOptions, Notifier};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

pub const ORIGIN: &str = "http://localhost:8000";

pub fn url(path: &str) -> Url {
    Url::parse(ORIGIN).unwrap().join(path).unwrap()
}

/// Network with canned responses and a kill switch
#[derive(Default)]
pub struct ScriptedFetcher {
    responses: Mutex<HashMap<String, Response>>,
    unreachable: Mutex<HashSet<String>>,
    offline: AtomicBool,
    calls: AtomicUsize,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, url: &Url, response: Response) {
        self.responses
            .lock()
            .unwrap()
            .insert(url.to_string(), response);
    }

    pub fn serve(&self, path: &str, body: &str) {
        self.respond(&url(path), Response::new(200, body));
    }

    pub fn fail(&self, url: &Url) {
        self.unreachable.lock().unwrap().insert(url.to_string());
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetcher for ScriptedFetcher {
    async fn fetch(&self, request: &Request) -> ProxyResult<Response> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let key = request.url.to_string();

        if self.offline.load(Ordering::SeqCst) || self.unreachable.lock().unwrap().contains(&key)
        {
            return Err(ProxyError::network(key, "connection refused"));
        }

        Ok(self
            .responses
            .lock()
            .unwrap()
            .get(&key)
            .cloned()
            .unwrap_or_else(|| Response::new(404, "not found")))
    }
}

/// Page registry that records what the proxy asked of it
#[derive(Default)]
pub struct RecordingClients {
    pub open_pages: Mutex<Vec<Url>>,
    pub claims: AtomicUsize,
    pub fail_claim: AtomicBool,
}

impl RecordingClients {
    pub fn with_pages(pages: Vec<Url>) -> Self {
        Self {
            open_pages: Mutex::new(pages),
            ..Self::default()
        }
    }
}

#[async_trait]
impl ClientHub for RecordingClients {
    async fn claim(&self) -> ProxyResult<usize> {
        if self.fail_claim.load(Ordering::SeqCst) {
            return Err(ProxyError::Internal("claim refused".to_string()));
        }
        self.claims.fetch_add(1, Ordering::SeqCst);
        Ok(self.open_pages.lock().unwrap().len())
    }

    async fn focus_or_open(&self, url: &Url) -> ProxyResult<ClientAction> {
        let mut pages = self.open_pages.lock().unwrap();
        if pages.iter().any(|p| p == url) {
            Ok(ClientAction::Focused)
        } else {
            pages.push(url.clone());
            Ok(ClientAction::Opened)
        }
    }
}

/// Notifier that keeps what it was shown
#[derive(Default)]
pub struct RecordingNotifier {
    pub shown: Mutex<Vec<NotificationOptions>>,
    pub closed: Mutex<Vec<String>>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn show(&self, notification: &NotificationOptions) -> ProxyResult<()> {
        self.shown.lock().unwrap().push(notification.clone());
        Ok(())
    }

    async fn close(&self, tag: &str) -> ProxyResult<()> {
        self.closed.lock().unwrap().push(tag.to_string());
        Ok(())
    }
}
