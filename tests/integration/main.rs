//! Integration tests for commute-cache

mod common {
    use async_trait::async_trait;
    use commute_cache::config::Config;
    use commute_cache::dispatcher::{Dispatcher, Host};
    use commute_cache::error::{ProxyError, ProxyResult};
    use commute_cache::http::{Request, Response, Url};
    use commute_cache::journal::Journal;
    use commute_cache::network::Fetcher;
    use commute_cache::notify::{ClientAction, ClientHub, NotificationOptions, Notifier};
    use commute_cache::proxy::{CacheProxy, Manifest, ProxySettings};
    use commute_cache::store::MemoryStore;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};

    pub const ORIGIN: &str = "http://localhost:8000";

    pub fn url(path: &str) -> Url {
        Url::parse(ORIGIN).unwrap().join(path).unwrap()
    }

    /// Network with canned bodies, a kill switch and a request log
    #[derive(Default)]
    pub struct FakeNetwork {
        bodies: Mutex<HashMap<String, String>>,
        offline: AtomicBool,
        log: Mutex<Vec<String>>,
    }

    impl FakeNetwork {
        pub fn serve(&self, path: &str, body: &str) {
            self.bodies
                .lock()
                .unwrap()
                .insert(url(path).to_string(), body.to_string());
        }

        pub fn set_offline(&self, offline: bool) {
            self.offline.store(offline, Ordering::SeqCst);
        }

        pub fn requests(&self) -> Vec<String> {
            self.log.lock().unwrap().clone()
        }

        pub fn clear_log(&self) {
            self.log.lock().unwrap().clear();
        }
    }

    #[async_trait]
    impl Fetcher for FakeNetwork {
        async fn fetch(&self, request: &Request) -> ProxyResult<Response> {
            let key = request.url.to_string();
            self.log.lock().unwrap().push(key.clone());

            if self.offline.load(Ordering::SeqCst) {
                return Err(ProxyError::network(key, "offline"));
            }
            Ok(match self.bodies.lock().unwrap().get(&key) {
                Some(body) => Response::new(200, body.as_str()),
                None => Response::new(404, "not found"),
            })
        }
    }

    #[derive(Default)]
    pub struct NullHost;

    #[async_trait]
    impl Notifier for NullHost {
        async fn show(&self, _notification: &NotificationOptions) -> ProxyResult<()> {
            Ok(())
        }

        async fn close(&self, _tag: &str) -> ProxyResult<()> {
            Ok(())
        }
    }

    #[async_trait]
    impl ClientHub for NullHost {
        async fn claim(&self) -> ProxyResult<usize> {
            Ok(0)
        }

        async fn focus_or_open(&self, _url: &Url) -> ProxyResult<ClientAction> {
            Ok(ClientAction::Opened)
        }
    }

    /// A dispatcher for `version` over a shared store and network
    pub fn worker(
        version: &str,
        manifest: &[&str],
        store: Arc<MemoryStore>,
        network: Arc<FakeNetwork>,
    ) -> Dispatcher {
        let mut config = Config::default();
        config.proxy.version_tag = version.to_string();
        config.proxy.origin = ORIGIN.to_string();
        config.proxy.shell_path = "/shell.html".to_string();
        config.manifest.urls = manifest.iter().map(|s| s.to_string()).collect();

        let settings = ProxySettings::from_config(&config.proxy).unwrap();
        let manifest = Manifest::resolve(&settings.origin, &config.manifest.urls).unwrap();
        let host = Arc::new(NullHost);
        let proxy = CacheProxy::new(settings, manifest, store, network, host.clone());

        Dispatcher::new(
            Arc::new(proxy),
            Host {
                notifier: host.clone(),
                clients: host,
            },
            &config,
            Journal::disabled(),
        )
    }

    pub fn network() -> Arc<FakeNetwork> {
        let network = Arc::new(FakeNetwork::default());
        network.serve("/shell.html", "<html>shell</html>");
        network.serve("/app.js", "app()");
        network.serve("/new.js", "new()");
        network
    }
}

mod scenario_tests {
    use super::common::*;
    use commute_cache::dispatcher::{Event, EventOutcome};
    use commute_cache::http::{CacheKey, Request};
    use commute_cache::proxy::ResponseSource;
    use commute_cache::store::{CacheStore, MemoryStore};
    use std::sync::Arc;

    #[tokio::test]
    async fn scenario_a_install_then_serve_from_cache() {
        let store = Arc::new(MemoryStore::new());
        let net = network();
        let worker = worker("v1", &["/shell.html", "/app.js"], store.clone(), net.clone());

        assert!(matches!(
            worker.dispatch(Event::install()).await,
            EventOutcome::Installed(_)
        ));
        assert_eq!(
            store.keys("v1").await.unwrap(),
            vec![CacheKey::for_url(&url("/app.js")), CacheKey::for_url(&url("/shell.html"))]
        );

        net.clear_log();
        let outcome = worker.fetch(Request::get(url("/app.js"))).await.unwrap();
        assert_eq!(outcome.source, ResponseSource::Cache);
        assert_eq!(outcome.response.text(), "app()");
        assert!(net.requests().is_empty());
    }

    #[tokio::test]
    async fn scenario_b_version_bump_replaces_bucket() {
        let store = Arc::new(MemoryStore::new());
        let net = network();

        let v1 = worker("v1", &["/shell.html", "/app.js"], store.clone(), net.clone());
        v1.dispatch(Event::install()).await;

        let v2 = worker(
            "v2",
            &["/shell.html", "/app.js", "/new.js"],
            store.clone(),
            net.clone(),
        );
        let outcome = v2.dispatch(Event::install()).await;
        let EventOutcome::Installed(report) = outcome else {
            panic!("install failed");
        };

        assert_eq!(report.activated.unwrap().deleted, vec!["v1".to_string()]);
        assert_eq!(store.list_buckets().await.unwrap(), vec!["v2".to_string()]);
        assert_eq!(store.keys("v2").await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn scenario_c_api_fallback_and_propagation() {
        let store = Arc::new(MemoryStore::new());
        let net = network();
        net.serve("/api/records", r#"[{"id":1}]"#);
        let worker = worker("v1", &["/shell.html"], store, net.clone());
        worker.dispatch(Event::install()).await;

        worker.fetch(Request::get(url("/api/records"))).await.unwrap();
        net.set_offline(true);

        let outcome = worker.fetch(Request::get(url("/api/records"))).await.unwrap();
        assert_eq!(outcome.source, ResponseSource::Cache);
        assert_eq!(outcome.response.text(), r#"[{"id":1}]"#);

        let err = worker
            .fetch(Request::get(url("/api/records2")))
            .await
            .unwrap_err();
        assert!(err.is_offline());
    }
}

mod property_tests {
    use super::common::*;
    use commute_cache::dispatcher::{Event, EventOutcome};
    use commute_cache::http::{CacheKey, Request, Response};
    use commute_cache::messages::{MessageEvent, ReplyPort};
    use commute_cache::proxy::ResponseSource;
    use commute_cache::store::{CacheStore, CachedEntry, MemoryStore};
    use serde_json::json;
    use std::sync::Arc;

    const MANIFEST: &[&str] = &["/shell.html", "/app.js"];

    #[tokio::test]
    async fn p1_install_is_idempotent() {
        let store = Arc::new(MemoryStore::new());
        let worker = worker("v1", MANIFEST, store.clone(), network());

        worker.dispatch(Event::install()).await;
        let once = store.keys("v1").await.unwrap();
        assert!(matches!(
            worker.dispatch(Event::install()).await,
            EventOutcome::Installed(_)
        ));
        assert_eq!(store.keys("v1").await.unwrap(), once);
    }

    #[tokio::test]
    async fn p2_activation_isolates_versions() {
        let store = Arc::new(MemoryStore::new());
        let net = network();
        net.serve("/api/stats", "{}");

        let v1 = worker("v1", MANIFEST, store.clone(), net.clone());
        v1.dispatch(Event::install()).await;
        v1.fetch(Request::get(url("/api/stats"))).await.unwrap();
        assert_eq!(store.keys("v1").await.unwrap().len(), 3);

        let v2 = worker("v2", MANIFEST, store.clone(), net.clone());
        v2.dispatch(Event::install()).await;
        v2.fetch(Request::get(url("/api/stats"))).await.unwrap();

        assert!(store.keys("v1").await.unwrap().is_empty());
        assert_eq!(store.list_buckets().await.unwrap(), vec!["v2".to_string()]);
        assert_eq!(store.keys("v2").await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn p3_network_first_returns_live_and_updates_cache() {
        let store = Arc::new(MemoryStore::new());
        let net = network();
        let worker = worker("v1", MANIFEST, store.clone(), net.clone());
        worker.dispatch(Event::install()).await;

        let key = CacheKey::for_url(&url("/api/records"));
        store
            .put("v1", CachedEntry::new(key.clone(), Response::new(200, "stale")))
            .await
            .unwrap();
        net.serve("/api/records", "live");

        let outcome = worker.fetch(Request::get(url("/api/records"))).await.unwrap();
        assert_eq!(outcome.source, ResponseSource::Network);
        assert_eq!(outcome.response.text(), "live");

        let cached = store.get("v1", &key).await.unwrap().unwrap();
        assert_eq!(cached.response.text(), "live");
    }

    #[tokio::test]
    async fn p4_cache_first_hit_makes_no_network_call() {
        let store = Arc::new(MemoryStore::new());
        let net = network();
        let worker = worker("v1", MANIFEST, store.clone(), net.clone());
        worker.dispatch(Event::install()).await;

        let key = CacheKey::for_url(&url("/shell.html"));
        let cached = store.get("v1", &key).await.unwrap().unwrap();

        net.clear_log();
        let outcome = worker.fetch(Request::get(url("/shell.html"))).await.unwrap();
        assert_eq!(outcome.response, cached.response);
        assert!(net.requests().is_empty());
    }

    #[tokio::test]
    async fn p5_network_failure_returns_last_cached() {
        let net = network();
        let worker = worker("v1", MANIFEST, Arc::new(MemoryStore::new()), net.clone());
        worker.dispatch(Event::install()).await;

        net.serve("/api/suggestions", "first");
        worker.fetch(Request::get(url("/api/suggestions"))).await.unwrap();
        net.serve("/api/suggestions", "second");
        worker.fetch(Request::get(url("/api/suggestions"))).await.unwrap();

        net.set_offline(true);
        let outcome = worker
            .fetch(Request::get(url("/api/suggestions")))
            .await
            .unwrap();
        assert_eq!(outcome.response.text(), "second");
    }

    #[tokio::test]
    async fn p6_failed_navigation_returns_shell() {
        let net = network();
        let worker = worker("v1", MANIFEST, Arc::new(MemoryStore::new()), net.clone());
        worker.dispatch(Event::install()).await;
        net.set_offline(true);

        let outcome = worker
            .fetch(Request::navigation(url("/records/42")))
            .await
            .unwrap();
        assert_eq!(outcome.source, ResponseSource::ShellFallback);
        assert_eq!(outcome.response.text(), "<html>shell</html>");
    }

    #[tokio::test]
    async fn p7_clear_cache_empties_store_and_replies_once() {
        let store = Arc::new(MemoryStore::new());
        let worker = worker("v1", MANIFEST, store.clone(), network());
        worker.dispatch(Event::install()).await;
        store
            .put(
                "legacy",
                CachedEntry::new(CacheKey::for_url(&url("/old.js")), Response::new(200, "")),
            )
            .await
            .unwrap();

        let (port, mut reply) = ReplyPort::channel();
        let message = MessageEvent::new(json!({"type": "CLEAR_CACHE"})).with_reply(port);
        let outcome = worker.dispatch(Event::Message(message)).await;

        assert!(matches!(
            outcome,
            EventOutcome::CacheCleared {
                buckets: 2,
                replied: true
            }
        ));
        assert!(store.list_buckets().await.unwrap().is_empty());
        assert!(reply.try_recv().unwrap().success);
        assert!(reply.try_recv().is_err());
    }

    #[tokio::test]
    async fn unknown_message_changes_nothing() {
        let store = Arc::new(MemoryStore::new());
        let worker = worker("v1", MANIFEST, store.clone(), network());
        worker.dispatch(Event::install()).await;

        let outcome = worker
            .dispatch(Event::Message(MessageEvent::new(json!({"type": "PING"}))))
            .await;
        assert!(matches!(outcome, EventOutcome::Ignored));
        assert_eq!(store.keys("v1").await.unwrap().len(), 2);
    }
}

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::path::Path;
    use tempfile::TempDir;

    /// Binary isolated to `home`: config, state and buckets all live there
    fn commute_cache(home: &Path) -> Command {
        let mut cmd = cargo_bin_cmd!("commute-cache");
        cmd.env("HOME", home)
            .env("XDG_CONFIG_HOME", home.join("config"))
            .env("XDG_STATE_HOME", home.join("state"))
            .env("XDG_DATA_HOME", home.join("data"))
            .env("COMMUTE_CACHE_CONFIG", home.join("config.toml"))
            .env("CI", "1");
        cmd
    }

    /// Config pointing at a closed local port so nothing reaches the network
    fn offline_config(home: &Path) {
        let config = format!(
            "[proxy]\norigin = \"http://127.0.0.1:9\"\n\n[manifest]\nurls = [\"/static/index.html\"]\n\n[store]\ndir = \"{}\"\n",
            home.join("buckets").display()
        );
        std::fs::write(home.join("config.toml"), config).unwrap();
    }

    #[test]
    fn help_displays() {
        let home = TempDir::new().unwrap();
        commute_cache(home.path())
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Offline cache proxy"));
    }

    #[test]
    fn version_displays() {
        let home = TempDir::new().unwrap();
        commute_cache(home.path())
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("commute-cache"));
    }

    #[test]
    fn config_path_uses_override() {
        let home = TempDir::new().unwrap();
        commute_cache(home.path())
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show_defaults() {
        let home = TempDir::new().unwrap();
        commute_cache(home.path())
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[proxy]"))
            .stdout(predicate::str::contains("commute-tracker-v1"));
    }

    #[test]
    fn config_set_then_show() {
        let home = TempDir::new().unwrap();
        commute_cache(home.path())
            .args(["config", "set", "proxy.version_tag", "commute-tracker-v9"])
            .assert()
            .success();

        commute_cache(home.path())
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("commute-tracker-v9"));
    }

    #[test]
    fn config_set_unknown_key_fails() {
        let home = TempDir::new().unwrap();
        commute_cache(home.path())
            .args(["config", "set", "vm.name", "x"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Unknown config key"));
    }

    #[test]
    fn config_set_invalid_value_fails() {
        let home = TempDir::new().unwrap();
        commute_cache(home.path())
            .args(["config", "set", "proxy.api_prefix", "api"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("api_prefix"));
    }

    #[test]
    fn status_before_install() {
        let home = TempDir::new().unwrap();
        offline_config(home.path());
        commute_cache(home.path())
            .arg("status")
            .assert()
            .success()
            .stdout(predicate::str::contains("not installed"));
    }

    #[test]
    fn buckets_empty_json() {
        let home = TempDir::new().unwrap();
        offline_config(home.path());
        commute_cache(home.path())
            .args(["buckets", "--format", "json"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[]"));
    }

    #[test]
    fn install_offline_fails_and_is_recorded() {
        let home = TempDir::new().unwrap();
        offline_config(home.path());

        commute_cache(home.path())
            .arg("install")
            .assert()
            .failure()
            .stderr(predicate::str::contains("Install failed"))
            .stderr(predicate::str::contains("Hint:"));

        commute_cache(home.path())
            .arg("status")
            .assert()
            .success()
            .stdout(predicate::str::contains("redundant"));
    }

    #[test]
    fn activate_before_install_fails() {
        let home = TempDir::new().unwrap();
        offline_config(home.path());
        commute_cache(home.path())
            .arg("activate")
            .assert()
            .failure()
            .stdout(predicate::str::contains("[FAIL]"))
            .stderr(predicate::str::contains("Invalid lifecycle transition"));
    }

    #[test]
    fn fetch_before_install_passes_through() {
        let home = TempDir::new().unwrap();
        offline_config(home.path());
        commute_cache(home.path())
            .args(["fetch", "/api/records"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Network request"));
    }

    #[test]
    fn unknown_message_is_ignored() {
        let home = TempDir::new().unwrap();
        offline_config(home.path());
        commute_cache(home.path())
            .args(["message", r#"{"type":"RELOAD"}"#])
            .assert()
            .success()
            .stdout(predicate::str::contains("ignored"));
    }

    #[test]
    fn malformed_message_fails() {
        let home = TempDir::new().unwrap();
        offline_config(home.path());
        commute_cache(home.path())
            .args(["message", "not json"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("JSON"));
    }

    #[test]
    fn clear_cache_requires_confirmation() {
        let home = TempDir::new().unwrap();
        offline_config(home.path());
        commute_cache(home.path())
            .arg("clear-cache")
            .assert()
            .success()
            .stdout(predicate::str::contains("Cancelled"));
    }

    #[test]
    fn clear_cache_with_yes_replies() {
        let home = TempDir::new().unwrap();
        offline_config(home.path());
        commute_cache(home.path())
            .args(["clear-cache", "--yes"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Cleared 0 bucket(s)"))
            .stdout(predicate::str::contains(r#"{"success":true}"#));
    }

    #[test]
    fn push_prints_notification() {
        let home = TempDir::new().unwrap();
        offline_config(home.path());
        commute_cache(home.path())
            .args(["push", "Leave in 5 minutes"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Commute Tracker"))
            .stdout(predicate::str::contains("Leave in 5 minutes"));
    }

    #[test]
    fn click_opens_page() {
        let home = TempDir::new().unwrap();
        offline_config(home.path());
        commute_cache(home.path())
            .arg("click")
            .assert()
            .success()
            .stdout(predicate::str::contains("Opened a new page"));
    }

    #[test]
    fn sync_known_tag() {
        let home = TempDir::new().unwrap();
        offline_config(home.path());
        commute_cache(home.path())
            .args(["sync", "sync-records"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Synced sync-records"));
    }
}
