//! qBittorrent torrent client implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{multipart, Client};
use tracing::{debug, info, warn};

use crate::config::QBittorrentConfig;

use super::{AddTorrentRequest, TorrentClient, TorrentClientError, TorrentSource};

/// qBittorrent client implementation.
///
/// Every add runs in its own cookie session: login, add, logout.
pub struct QBittorrentClient {
    config: QBittorrentConfig,
}

fn map_request_error(e: reqwest::Error) -> TorrentClientError {
    if e.is_timeout() {
        TorrentClientError::Timeout
    } else if e.is_connect() {
        TorrentClientError::ConnectionFailed(e.to_string())
    } else {
        TorrentClientError::ApiError(e.to_string())
    }
}

impl QBittorrentClient {
    /// Create a new qBittorrent client.
    pub fn new(config: QBittorrentConfig) -> Self {
        Self { config }
    }

    /// Get the base URL without trailing slash.
    fn base_url(&self) -> &str {
        self.config.url.trim_end_matches('/')
    }

    fn session(&self) -> Result<Client, TorrentClientError> {
        Client::builder()
            .timeout(Duration::from_secs(self.config.timeout_secs as u64))
            .cookie_store(true)
            .build()
            .map_err(|e| TorrentClientError::ApiError(format!("Failed to create HTTP client: {}", e)))
    }

    /// Login; the session cookie lands in the client's cookie jar.
    async fn login(&self, session: &Client) -> Result<(), TorrentClientError> {
        let url = format!("{}/api/v2/auth/login", self.base_url());

        let params = [
            ("username", self.config.username.as_str()),
            ("password", self.config.password.as_str()),
        ];

        let response = session
            .post(&url)
            .form(&params)
            .send()
            .await
            .map_err(map_request_error)?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if status.is_success() && !body.contains("Fails.") {
            debug!("qBittorrent login successful");
            Ok(())
        } else if body.contains("Fails.") || status.as_u16() == 403 {
            Err(TorrentClientError::AuthenticationFailed(
                "Invalid credentials".to_string(),
            ))
        } else {
            Err(TorrentClientError::AuthenticationFailed(format!(
                "Unexpected response: {}",
                body.chars().take(100).collect::<String>()
            )))
        }
    }

    async fn logout(&self, session: &Client) {
        let url = format!("{}/api/v2/auth/logout", self.base_url());
        if let Err(e) = session.post(&url).send().await {
            debug!(error = %e, "qBittorrent logout failed");
        }
    }

    async fn download_torrent_file(
        &self,
        session: &Client,
        url: &str,
    ) -> Result<Vec<u8>, TorrentClientError> {
        let response = session.get(url).send().await.map_err(map_request_error)?;
        if !response.status().is_success() {
            return Err(TorrentClientError::InvalidTorrent(format!(
                "HTTP {} fetching torrent file",
                response.status()
            )));
        }
        Ok(response
            .bytes()
            .await
            .map_err(|e| TorrentClientError::InvalidTorrent(e.to_string()))?
            .to_vec())
    }

    async fn build_form(
        &self,
        session: &Client,
        request: &AddTorrentRequest,
    ) -> Result<multipart::Form, TorrentClientError> {
        let form = multipart::Form::new()
            .text("rename", request.name.clone())
            .text("tags", self.config.tag.clone())
            .text("sequentialDownload", "true")
            .text("firstLastPiecePrio", "true")
            .text("skip_checking", "true")
            .text("ratioLimit", "1")
            .text("seedingTimeLimit", "1440");

        match &request.source {
            TorrentSource::Magnet(uri) => Ok(form.text("urls", uri.clone())),
            TorrentSource::TorrentUrl(url) => {
                let data = self.download_torrent_file(session, url).await?;
                let file_part = multipart::Part::bytes(data)
                    .file_name("torrent_file.torrent")
                    .mime_str("application/x-bittorrent")
                    .map_err(|e| TorrentClientError::InvalidTorrent(e.to_string()))?;
                Ok(form.part("torrents", file_part))
            }
        }
    }

    async fn add_in_session(
        &self,
        session: &Client,
        request: &AddTorrentRequest,
    ) -> Result<(), TorrentClientError> {
        let form = self.build_form(session, request).await?;
        let url = format!("{}/api/v2/torrents/add", self.base_url());

        let response = session
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(map_request_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(TorrentClientError::ApiError(format!("HTTP {}", status)));
        }
        Ok(())
    }
}

#[async_trait]
impl TorrentClient for QBittorrentClient {
    fn name(&self) -> &str {
        "qbittorrent"
    }

    async fn add_torrent(&self, request: AddTorrentRequest) -> Result<(), TorrentClientError> {
        let session = self.session()?;
        self.login(&session).await?;

        let result = self.add_in_session(&session, &request).await;
        self.logout(&session).await;

        match &result {
            Ok(()) => info!(name = %request.name, "Torrent added to qBittorrent"),
            Err(e) => warn!(name = %request.name, error = %e, "Failed to add torrent to qBittorrent"),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        extract::{Multipart, State},
        http::{header, StatusCode},
        response::IntoResponse,
        routing::{get, post},
        Form, Router,
    };
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct Recorded {
        calls: Vec<String>,
        fields: HashMap<String, String>,
        torrent_bytes: Option<Vec<u8>>,
    }

    type Shared = Arc<Mutex<Recorded>>;

    async fn login(State(state): State<Shared>, Form(form): Form<HashMap<String, String>>) -> impl IntoResponse {
        state.lock().unwrap().calls.push("login".to_string());
        if form.get("password").map(String::as_str) == Some("secret") {
            ([(header::SET_COOKIE, "SID=abc; path=/")], "Ok.").into_response()
        } else {
            "Fails.".into_response()
        }
    }

    async fn add(State(state): State<Shared>, headers: axum::http::HeaderMap, mut multipart: Multipart) -> StatusCode {
        let has_cookie = headers
            .get(header::COOKIE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.contains("SID=abc"));
        if !has_cookie {
            return StatusCode::FORBIDDEN;
        }

        state.lock().unwrap().calls.push("add".to_string());

        while let Ok(Some(field)) = multipart.next_field().await {
            let name = field.name().unwrap_or_default().to_string();
            let bytes = field.bytes().await.unwrap().to_vec();
            let mut recorded = state.lock().unwrap();
            if name == "torrents" {
                recorded.torrent_bytes = Some(bytes);
            } else {
                recorded.fields.insert(name, String::from_utf8(bytes).unwrap());
            }
        }
        StatusCode::OK
    }

    async fn logout(State(state): State<Shared>) -> StatusCode {
        state.lock().unwrap().calls.push("logout".to_string());
        StatusCode::OK
    }

    async fn serve(state: Shared) -> String {
        let app = Router::new()
            .route("/api/v2/auth/login", post(login))
            .route("/api/v2/torrents/add", post(add))
            .route("/api/v2/auth/logout", post(logout))
            .route("/file.torrent", get(|| async { b"d4:infod4:name1:aee".to_vec() }))
            .with_state(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        format!("http://{}", addr)
    }

    fn config(url: &str, password: &str) -> QBittorrentConfig {
        QBittorrentConfig {
            url: url.to_string(),
            username: "admin".to_string(),
            password: password.to_string(),
            tag: "seekbot".to_string(),
            timeout_secs: 5,
        }
    }

    #[tokio::test]
    async fn test_add_magnet_in_session() {
        let state = Shared::default();
        let base = serve(state.clone()).await;
        let client = QBittorrentClient::new(config(&base, "secret"));

        client
            .add_torrent(AddTorrentRequest {
                source: TorrentSource::Magnet("magnet:?xt=urn:btih:abc".to_string()),
                name: "Ubuntu".to_string(),
            })
            .await
            .unwrap();

        let recorded = state.lock().unwrap();
        assert_eq!(recorded.calls, vec!["login", "add", "logout"]);
        assert_eq!(recorded.fields["urls"], "magnet:?xt=urn:btih:abc");
        assert_eq!(recorded.fields["rename"], "Ubuntu");
        assert_eq!(recorded.fields["tags"], "seekbot");
        assert_eq!(recorded.fields["sequentialDownload"], "true");
        assert_eq!(recorded.fields["seedingTimeLimit"], "1440");
    }

    #[tokio::test]
    async fn test_add_torrent_url_uploads_file() {
        let state = Shared::default();
        let base = serve(state.clone()).await;
        let client = QBittorrentClient::new(config(&base, "secret"));

        client
            .add_torrent(AddTorrentRequest {
                source: TorrentSource::TorrentUrl(format!("{}/file.torrent", base)),
                name: "Pack".to_string(),
            })
            .await
            .unwrap();

        let recorded = state.lock().unwrap();
        assert_eq!(recorded.torrent_bytes.as_deref(), Some(&b"d4:infod4:name1:aee"[..]));
        assert!(!recorded.fields.contains_key("urls"));
    }

    #[tokio::test]
    async fn test_bad_credentials() {
        let state = Shared::default();
        let base = serve(state.clone()).await;
        let client = QBittorrentClient::new(config(&base, "wrong"));

        let err = client
            .add_torrent(AddTorrentRequest {
                source: TorrentSource::Magnet("magnet:?xt=urn:btih:abc".to_string()),
                name: "Ubuntu".to_string(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, TorrentClientError::AuthenticationFailed(_)));
        assert_eq!(state.lock().unwrap().calls, vec!["login"]);
    }
}
