//! Tests that run the `seekbot` binary as a separate process.

use std::io::Write;
use std::net::TcpListener;
use std::path::Path;
use std::process::Output;
use std::time::Duration;

use reqwest::Client;
use serde_json::{json, Value};
use tempfile::NamedTempFile;
use tokio::process::{Child, Command};
use tokio::time::{sleep, timeout};

fn free_port() -> u16 {
    TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

/// Config pointing every remote service at a closed port.
fn minimal_config(port: u16, log_dir: &Path) -> String {
    format!(
        r#"
[server]
host = "127.0.0.1"
port = {}

[jackett]
url = "http://127.0.0.1:9"
api_key = "secret"

[torrserver]
url = "http://127.0.0.1:9"

[query_log]
path = "{}"
"#,
        port,
        log_dir.join("queries.log").display()
    )
}

fn write_config(content: &str) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(content.as_bytes()).unwrap();
    temp_file.flush().unwrap();
    temp_file
}

fn seekbot(config_path: &Path) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_seekbot"));
    command
        .env("SEEKBOT_CONFIG", config_path)
        .env("RUST_LOG", "error")
        .kill_on_drop(true);
    command
}

/// A running server plus the client used to talk to it.
struct Running {
    child: Child,
    client: Client,
    base: String,
}

impl Running {
    async fn start(mut command: Command, port: u16) -> Self {
        let child = command.spawn().expect("Failed to spawn seekbot");
        let running = Self {
            child,
            client: Client::new(),
            base: format!("http://127.0.0.1:{}", port),
        };
        assert!(running.wait_ready().await, "seekbot did not start in time");
        running
    }

    async fn wait_ready(&self) -> bool {
        for _ in 0..100 {
            if self.client.get(self.url("/api/v1/health")).send().await.is_ok() {
                return true;
            }
            sleep(Duration::from_millis(50)).await;
        }
        false
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    async fn get_json(&self, path: &str) -> Value {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("request failed")
            .json()
            .await
            .expect("body is not JSON")
    }

    async fn stop(mut self) {
        self.child.kill().await.ok();
    }
}

async fn run_to_exit(mut command: Command) -> Output {
    timeout(Duration::from_secs(5), command.output())
        .await
        .expect("seekbot did not exit")
        .expect("Failed to execute seekbot")
}

#[tokio::test]
async fn test_health_and_config_endpoints() {
    let port = free_port();
    let log_dir = tempfile::tempdir().unwrap();
    let config_file = write_config(&minimal_config(port, log_dir.path()));

    let server = Running::start(seekbot(config_file.path()), port).await;

    assert_eq!(server.get_json("/api/v1/health").await["status"], "ok");

    let config = server.get_json("/api/v1/config").await;
    assert_eq!(config["server"]["port"], port);
    assert_eq!(config["jackett"]["api_key_configured"], true);
    assert!(config["jackett"].get("api_key").is_none());

    server.stop().await;
}

#[tokio::test]
async fn test_env_overrides_config_file() {
    let port = free_port();
    let log_dir = tempfile::tempdir().unwrap();
    let config_file = write_config(&minimal_config(0, log_dir.path()));

    let mut command = seekbot(config_file.path());
    command.env("SEEKBOT_SERVER__PORT", port.to_string());
    let server = Running::start(command, port).await;

    assert_eq!(server.get_json("/api/v1/config").await["server"]["port"], port);

    server.stop().await;
}

#[tokio::test]
async fn test_update_without_chat_adapter_is_bad_gateway() {
    let port = free_port();
    let log_dir = tempfile::tempdir().unwrap();
    let config_file = write_config(&minimal_config(port, log_dir.path()));

    let server = Running::start(seekbot(config_file.path()), port).await;

    let response = server
        .client
        .post(server.url("/api/v1/updates"))
        .json(&json!({"user_id": 42, "text": "/start"}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 502);
    let body: Value = response.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("no chat adapter"));

    server.stop().await;
}

#[tokio::test]
async fn test_missing_config_file_exits_with_error() {
    let output = run_to_exit(seekbot(Path::new("/nonexistent/config.toml"))).await;
    assert!(!output.status.success());
}

#[tokio::test]
async fn test_missing_torrserver_section_exits_with_error() {
    let config_file = write_config(
        r#"
[jackett]
url = "http://127.0.0.1:9"
api_key = "secret"
"#,
    );

    let output = run_to_exit(seekbot(config_file.path())).await;
    assert!(!output.status.success());
}
