//! In-process API tests: updates in over HTTP, responses out over the broadcast stream.

mod common;

use std::time::Duration;

use axum::http::StatusCode;
use serde_json::json;

use common::{fixtures, TestFixture};
use seekbot_core::{messages, torrent_client::TorrentSource};
use seekbot_server::api::WsMessage;

fn sent_texts(messages: &[WsMessage]) -> Vec<String> {
    messages
        .iter()
        .filter_map(|m| match m {
            WsMessage::Send { response, .. } => Some(response.message.clone()),
            _ => None,
        })
        .collect()
}

async fn search(fixture: &mut TestFixture, text: &str) -> String {
    let response = fixture
        .post("/api/v1/updates", json!({ "user_id": 7, "text": text }))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    fixture.state.bot().cache().fingerprint(&text.to_lowercase())
}

#[tokio::test]
async fn test_health() {
    let fixture = TestFixture::new();
    let response = fixture.get("/api/v1/health").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");
}

#[tokio::test]
async fn test_config_is_sanitized() {
    let fixture = TestFixture::new();
    let (status, text) = fixture.get_text("/api/v1/config").await;
    assert_eq!(status, StatusCode::OK);
    assert!(!text.contains("jackett-secret"));
    assert!(!text.contains("qbit-secret"));

    let response = fixture.get("/api/v1/config").await;
    assert_eq!(response.body["jackett"]["api_key_configured"], true);
    assert!(response.body["jackett"].get("api_key").is_none());
    assert_eq!(response.body["qbittorrent"]["password_configured"], true);
    assert_eq!(response.body["torrserver"]["url"], "http://torrserver.local:8090");
}

#[tokio::test]
async fn test_search_update_streams_results() {
    let mut fixture = TestFixture::new();
    fixture.indexer.set_results(vec![
        fixtures::search_result("AAAAAA", 30),
        fixtures::search_result("BBBBBB", 3),
    ]);

    let response = fixture
        .post("/api/v1/updates", json!({ "user_id": 7, "text": "Ubuntu" }))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["status"], "ok");

    let fp = fixture.state.bot().cache().fingerprint("ubuntu");
    let streamed = fixture.drain_messages();
    assert_eq!(streamed.len(), 2);

    match &streamed[1] {
        WsMessage::Send {
            message_id,
            response,
        } => {
            assert_eq!(*message_id, 2);
            assert_eq!(response.user_id, 7);
            assert!(response.message.contains(&format!("/select_{}_AAAAAA", fp)));
        }
        other => panic!("expected a sent message, got {:?}", other),
    }
}

#[tokio::test]
async fn test_invalid_command_is_bad_request() {
    let mut fixture = TestFixture::new();

    let response = fixture
        .post("/api/v1/updates", json!({ "user_id": 7, "text": "/bogus" }))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.body["error"].as_str().unwrap().contains("/bogus"));
    assert_eq!(
        sent_texts(&fixture.drain_messages()),
        vec![messages::INVALID_COMMAND]
    );
}

#[tokio::test]
async fn test_malformed_update_is_rejected() {
    let fixture = TestFixture::new();
    let response = fixture
        .post("/api/v1/updates", json!({ "text": "no user id" }))
        .await;

    assert!(response.status.is_client_error());
    assert_eq!(fixture.indexer.call_counter().get(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_selection_is_edited_with_file_list() {
    let mut fixture = TestFixture::new();
    fixture
        .indexer
        .set_results(vec![fixtures::search_result("AAAAAA", 30)]);
    let fp = search(&mut fixture, "movie").await;
    fixture.drain_messages();

    let response = fixture
        .post(
            "/api/v1/updates",
            json!({ "user_id": 7, "text": format!("/select_{}_AAAAAA", fp) }),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    tokio::time::sleep(Duration::from_secs(1)).await;

    let streamed = fixture.drain_messages();
    let selection_id = match &streamed[0] {
        WsMessage::Send { message_id, .. } => *message_id,
        other => panic!("expected the selection message, got {:?}", other),
    };
    match &streamed[1] {
        WsMessage::Edit {
            message_id,
            response,
        } => {
            assert_eq!(*message_id, selection_id);
            assert!(response.message.contains(messages::FILES_IN_TORRENT));
            assert!(response.message.contains(&format!("/file_{}_AAAAAA_1", fp)));
        }
        other => panic!("expected an edit, got {:?}", other),
    }
    assert_eq!(
        fixture.backend.added_links(),
        vec!["magnet:?xt=urn:btih:aaaaaa"]
    );
}

#[tokio::test]
async fn test_filter_callback_on_expired_search() {
    let mut fixture = TestFixture::new();

    let command = seekbot_core::presentation::FilterAffordance::new(
        seekbot_core::SizeFilter::MoreThan10Gb,
        "DEAD00",
    )
    .command;
    let response = fixture
        .post(
            "/api/v1/updates",
            json!({ "user_id": 7, "callback": command }),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        sent_texts(&fixture.drain_messages()),
        vec![messages::SEARCH_EXPIRED]
    );
}

#[tokio::test]
async fn test_result_sent_to_qbittorrent() {
    let mut fixture = TestFixture::new();
    fixture
        .indexer
        .set_results(vec![fixtures::search_result("AAAAAA", 30)]);
    let fp = search(&mut fixture, "ubuntu").await;

    let response = fixture
        .post_empty(&format!("/api/v1/qbittorrent/{}/AAAAAA", fp))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["client"], "mock");
    assert_eq!(response.body["name"], "Result AAAAAA");

    let added = fixture.torrent_client.added();
    assert_eq!(added.len(), 1);
    assert_eq!(
        added[0].source,
        TorrentSource::Magnet("magnet:?xt=urn:btih:aaaaaa".to_string())
    );
}

#[tokio::test]
async fn test_qbittorrent_unknown_result() {
    let fixture = TestFixture::new();
    let response = fixture.post_empty("/api/v1/qbittorrent/DEAD00/AAAAAA").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_qbittorrent_failure_is_bad_gateway() {
    let mut fixture = TestFixture::new();
    fixture
        .indexer
        .set_results(vec![fixtures::search_result("AAAAAA", 30)]);
    let fp = search(&mut fixture, "ubuntu").await;
    fixture.torrent_client.fail_with("disk full");

    let response = fixture
        .post_empty(&format!("/api/v1/qbittorrent/{}/AAAAAA", fp))
        .await;

    assert_eq!(response.status, StatusCode::BAD_GATEWAY);
    assert!(response.body["error"].as_str().unwrap().contains("disk full"));
}

#[tokio::test]
async fn test_qbittorrent_not_configured() {
    let fixture = TestFixture::without_torrent_client();
    let response = fixture.post_empty("/api/v1/qbittorrent/DEAD00/AAAAAA").await;
    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_metrics_exposition() {
    let fixture = TestFixture::new();
    fixture.get("/api/v1/health").await;

    let (status, text) = fixture.get_text("/metrics").await;

    assert_eq!(status, StatusCode::OK);
    assert!(text.contains("seekbot_http_requests_total"));
    assert!(text.contains("/api/v1/health"));
}

#[tokio::test]
async fn test_unknown_route() {
    let fixture = TestFixture::new();
    let response = fixture.get("/api/v1/nope").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
