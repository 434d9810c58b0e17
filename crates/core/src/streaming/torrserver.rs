//! TorrServer streaming backend client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::TorrServerConfig;

use super::{BackendError, BackendFile, StreamingBackend, TorrentMetadata};

/// TorrServer client, speaking the `/torrents` and `/cache` JSON endpoints.
pub struct TorrServerClient {
    client: Client,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct AddRequest<'a> {
    action: &'a str,
    link: &'a str,
    title: &'a str,
    poster: &'a str,
    save_to_db: bool,
}

#[derive(Debug, Deserialize)]
struct AddResponse {
    hash: String,
}

#[derive(Debug, Serialize)]
struct CacheRequest<'a> {
    action: &'a str,
    hash: &'a str,
}

#[derive(Debug, Deserialize)]
struct CacheResponse {
    #[serde(rename = "Torrent", default)]
    torrent: Option<CacheTorrent>,
}

#[derive(Debug, Deserialize)]
struct CacheTorrent {
    #[serde(default)]
    title: String,
    #[serde(default)]
    torrent_size: Option<i64>,
    #[serde(default)]
    file_stats: Option<Vec<FileStat>>,
}

#[derive(Debug, Deserialize)]
struct FileStat {
    id: u64,
    path: String,
    #[serde(default)]
    length: Option<i64>,
}

impl CacheTorrent {
    fn into_metadata(self) -> TorrentMetadata {
        TorrentMetadata {
            title: self.title,
            torrent_size: self.torrent_size.filter(|s| *s > 0).map(|s| s as u64),
            files: self
                .file_stats
                .unwrap_or_default()
                .into_iter()
                .map(|f| BackendFile {
                    id: f.id,
                    path: f.path,
                    length: f.length.filter(|l| *l >= 0).map(|l| l as u64),
                })
                .collect(),
        }
    }
}

fn map_request_error(e: reqwest::Error) -> BackendError {
    if e.is_timeout() {
        BackendError::Timeout
    } else {
        BackendError::Unavailable(e.to_string())
    }
}

impl TorrServerClient {
    pub fn new(config: &TorrServerConfig) -> Result<Self, BackendError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs as u64))
            .build()
            .map_err(|e| BackendError::Unavailable(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
        })
    }

    async fn post_json<T: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &T,
    ) -> Result<reqwest::Response, BackendError> {
        let url = format!("{}{}", self.base_url, endpoint);
        let response = self
            .client
            .post(&url)
            .header("accept", "application/json, text/plain, */*")
            .json(body)
            .send()
            .await
            .map_err(map_request_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::Unavailable(format!("HTTP {}", status)));
        }
        Ok(response)
    }
}

#[async_trait]
impl StreamingBackend for TorrServerClient {
    fn name(&self) -> &str {
        "torrserver"
    }

    async fn add_torrent(&self, magnet: &str) -> Result<String, BackendError> {
        let request = AddRequest {
            action: "add",
            link: magnet,
            title: "",
            poster: "",
            save_to_db: false,
        };

        let response: AddResponse = self
            .post_json("/torrents", &request)
            .await?
            .json()
            .await
            .map_err(|e| BackendError::InvalidResponse(e.to_string()))?;

        debug!(hash = %response.hash, "Torrent added to TorrServer");
        Ok(response.hash)
    }

    async fn torrent_metadata(&self, hash: &str) -> Result<Option<TorrentMetadata>, BackendError> {
        let request = CacheRequest {
            action: "get",
            hash,
        };

        let response: CacheResponse = self
            .post_json("/cache", &request)
            .await?
            .json()
            .await
            .map_err(|e| BackendError::InvalidResponse(e.to_string()))?;

        Ok(response.torrent.map(CacheTorrent::into_metadata))
    }

    async fn touch(&self, hash: &str) -> Result<(), BackendError> {
        let request = CacheRequest {
            action: "get",
            hash,
        };
        self.post_json("/cache", &request).await?;
        Ok(())
    }

    fn play_link(&self, hash: &str, file_id: &str) -> String {
        format!("{}/play/{}/{}", self.base_url, hash, file_id)
    }
}

/// Rewrite an internal backend link so it points at the public host.
///
/// The scheme and authority of `link` are replaced by `advertised_host`;
/// path and query are kept. Without a host, or for unparsable links, the
/// link is returned as is.
pub fn advertised_link(link: &str, advertised_host: Option<&str>) -> String {
    let Some(host) = advertised_host.filter(|h| !h.is_empty()) else {
        return link.to_string();
    };
    let Ok(parsed) = Url::parse(link) else {
        return link.to_string();
    };

    let mut rewritten = format!("{}{}", host.trim_end_matches('/'), parsed.path());
    if let Some(query) = parsed.query() {
        rewritten.push('?');
        rewritten.push_str(query);
    }
    rewritten
}
