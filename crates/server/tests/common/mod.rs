//! Common test utilities for in-process API testing with mocks.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tokio::sync::broadcast;
use tower::ServiceExt;

use seekbot_core::{
    load_config_from_str,
    testing::{MockIndexer, MockResolver, MockStreamingBackend, MockTorrentClient},
    Bot, BotSettings, ResultCache, SearchOrchestrator, TorrentClient, TorrentInfoPoller,
};
use seekbot_server::api::{create_router, WsBroadcaster, WsMessage, WsOutbox};
use seekbot_server::state::AppState;

/// Re-export fixtures for test convenience
pub use seekbot_core::testing::fixtures;

pub const TEST_CONFIG: &str = r#"
[server]
host = "127.0.0.1"
port = 8080

[jackett]
url = "http://jackett.local:9117"
api_key = "jackett-secret"

[torrserver]
url = "http://torrserver.local:8090"

[qbittorrent]
url = "http://qbittorrent.local:8080"
username = "admin"
password = "qbit-secret"

[query_log]
enabled = false
"#;

/// In-process server with controllable mocks behind the bot.
///
/// # Example
///
/// ```rust,ignore
/// let mut fixture = TestFixture::new();
/// fixture.indexer.set_results(vec![fixtures::search_result("AAAAAA", 5)]);
/// let response = fixture.post("/api/v1/updates", json!({"user_id": 1, "text": "ubuntu"})).await;
/// ```
pub struct TestFixture {
    pub router: Router,
    pub state: Arc<AppState>,
    pub indexer: Arc<MockIndexer>,
    pub backend: Arc<MockStreamingBackend>,
    pub torrent_client: Arc<MockTorrentClient>,
    /// Subscribed before any request, so every outgoing message is captured
    pub messages: broadcast::Receiver<WsMessage>,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestFixture {
    pub fn new() -> Self {
        Self::build(true)
    }

    /// Fixture without a qBittorrent client.
    pub fn without_torrent_client() -> Self {
        Self::build(false)
    }

    fn build(with_torrent_client: bool) -> Self {
        let config = load_config_from_str(TEST_CONFIG).expect("Failed to parse test config");

        let indexer = Arc::new(MockIndexer::new());
        let backend =
            Arc::new(MockStreamingBackend::new().ready_after(1, fixtures::metadata()));
        let torrent_client = Arc::new(MockTorrentClient::new());

        let ws_broadcaster = WsBroadcaster::default();
        let messages = ws_broadcaster.subscribe();

        let bot = Bot::new(
            SearchOrchestrator::new(indexer.clone(), config.search.clone()),
            ResultCache::new(&config.results),
            Arc::new(MockResolver::new()),
            TorrentInfoPoller::new(backend.clone(), config.poller.clone()),
            Arc::new(WsOutbox::new(ws_broadcaster.clone())),
            BotSettings::from_config(&config),
        );

        let client = with_torrent_client
            .then(|| Arc::clone(&torrent_client) as Arc<dyn TorrentClient>);

        let state = Arc::new(AppState::new(config, Arc::new(bot), ws_broadcaster, client));
        let router = create_router(Arc::clone(&state));

        Self {
            router,
            state,
            indexer,
            backend,
            torrent_client,
            messages,
        }
    }

    /// Drain every message broadcast so far.
    pub fn drain_messages(&mut self) -> Vec<WsMessage> {
        let mut drained = Vec::new();
        while let Ok(msg) = self.messages.try_recv() {
            drained.push(msg);
        }
        drained
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a POST request without a body.
    pub async fn post_empty(&self, path: &str) -> TestResponse {
        self.request("POST", path, None).await
    }

    /// Send a GET request and return the raw body text.
    pub async fn get_text(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();
        (status, String::from_utf8_lossy(&bytes).to_string())
    }

    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}
