//! Types for torrent client operations.

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during torrent client operations.
#[derive(Debug, Error)]
pub enum TorrentClientError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Invalid torrent data: {0}")]
    InvalidTorrent(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Request timeout")]
    Timeout,
}

/// Where the client should get the torrent from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TorrentSource {
    Magnet(String),
    /// `.torrent` URL, downloaded before it is handed to the client.
    TorrentUrl(String),
}

impl TorrentSource {
    /// Classify a link by its scheme.
    pub fn from_link(link: impl Into<String>) -> Self {
        let link = link.into();
        if link.starts_with("magnet:") {
            TorrentSource::Magnet(link)
        } else {
            TorrentSource::TorrentUrl(link)
        }
    }
}

/// Request to add a torrent to a download client.
#[derive(Debug, Clone)]
pub struct AddTorrentRequest {
    pub source: TorrentSource,
    /// Display name given to the torrent.
    pub name: String,
}

/// A download client that accepts torrents (qBittorrent).
#[async_trait]
pub trait TorrentClient: Send + Sync {
    /// Human-readable name for this client.
    fn name(&self) -> &str;

    /// Add a torrent. Best effort: nothing is tracked once it is accepted.
    async fn add_torrent(&self, request: AddTorrentRequest) -> Result<(), TorrentClientError>;
}
