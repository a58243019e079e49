//! Remote configuration fetch against a mock server

use snitch_config::alert::Alert;
use snitch_config::config::ApplyOutcome;
use snitch_config::{ConfigStore, HttpFetcher, KeyValueStore, MemoryStore, StoreKey};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Default)]
struct CountingAlert(AtomicUsize);

impl Alert for CountingAlert {
    fn alert(&self, _message: &str) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

fn config_store(store: Arc<MemoryStore>, alert: Arc<CountingAlert>) -> ConfigStore {
    let fetcher = Arc::new(HttpFetcher::new(Duration::from_secs(5)).unwrap());
    ConfigStore::new(store, fetcher).with_alert(alert)
}

#[tokio::test]
async fn test_remote_document_is_applied() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ds/config.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("/* hosted */\n{\"scope\": [\"*.corp.test\"], \"components\": [\"DOMSnitch\"]}"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryStore::new());
    let alert = Arc::new(CountingAlert::default());
    let mut config = config_store(store.clone(), alert.clone());
    config
        .set_config_url(&format!("{}/ds/config.json", server.uri()))
        .unwrap();

    let outcome = config.apply_config(None).await.unwrap();
    assert!(matches!(outcome, ApplyOutcome::Fetched(_)));
    assert!(config.is_url_in_scope("https://app.corp.test/login?next=/").unwrap());
    assert!(!config.is_url_in_scope("https://corp.test/").unwrap());
    assert_eq!(config.default_mode(), Some(1));
    assert_eq!(alert.0.load(Ordering::SeqCst), 0);

    let requests = server.received_requests().await.unwrap();
    let since = requests[0]
        .headers
        .get("if-modified-since")
        .and_then(|v| v.to_str().ok());
    assert_eq!(since, Some("Thu, 01 Jan 1970 00:00:00 GMT"));
}

#[tokio::test]
async fn test_http_error_status_alerts_and_keeps_state() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_string("{\"scope\": [\"evil.test\"]}"))
        .mount(&server)
        .await;

    let store = Arc::new(MemoryStore::new());
    store.set(StoreKey::Scope.as_str(), r#"["a.test"]"#).unwrap();
    let alert = Arc::new(CountingAlert::default());
    let mut config = config_store(store.clone(), alert.clone());
    config.set_config_url(&server.uri()).unwrap();

    let outcome = config.apply_config(None).await.unwrap();
    assert!(matches!(outcome, ApplyOutcome::Failed(reason) if reason.contains("404")));
    assert_eq!(alert.0.load(Ordering::SeqCst), 1);
    assert_eq!(store.get(StoreKey::Scope.as_str()).as_deref(), Some(r#"["a.test"]"#));
}

#[tokio::test]
async fn test_cached_document_skips_network() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .expect(0)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryStore::new());
    store
        .set(StoreKey::CachedConfig.as_str(), r#"{"scope": ["cached.test"]}"#)
        .unwrap();
    let mut config = config_store(store.clone(), Arc::new(CountingAlert::default()));
    config.set_config_url(&server.uri()).unwrap();

    let outcome = config.apply_config(None).await.unwrap();
    let cached = outcome.document().unwrap();
    assert_eq!(cached.scope, Some(vec!["cached.test".to_string()]));
    assert_eq!(store.get(StoreKey::Scope.as_str()), None);
}
