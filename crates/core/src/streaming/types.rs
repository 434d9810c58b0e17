//! Types for streaming backend operations.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur while talking to the streaming backend.
#[derive(Debug, Clone, Error)]
pub enum BackendError {
    #[error("Streaming backend unavailable: {0}")]
    Unavailable(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Invalid response from streaming backend: {0}")]
    InvalidResponse(String),
}

/// A file inside a torrent, as reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendFile {
    pub id: u64,
    pub path: String,
    pub length: Option<u64>,
}

/// Torrent metadata once the backend has fetched it from peers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TorrentMetadata {
    pub title: String,
    pub torrent_size: Option<u64>,
    pub files: Vec<BackendFile>,
}

impl TorrentMetadata {
    /// Metadata is only usable once the file list has arrived.
    pub fn is_complete(&self) -> bool {
        !self.files.is_empty()
    }
}

/// A remote service that fetches torrents and serves their files over HTTP.
#[async_trait]
pub trait StreamingBackend: Send + Sync {
    /// Human-readable name for this backend.
    fn name(&self) -> &str;

    /// Ask the backend to start processing a magnet link, returning its hash.
    async fn add_torrent(&self, magnet: &str) -> Result<String, BackendError>;

    /// Current metadata for a torrent, `None` while the backend has nothing yet.
    async fn torrent_metadata(&self, hash: &str) -> Result<Option<TorrentMetadata>, BackendError>;

    /// Read the torrent's cache entry so the backend keeps it alive.
    async fn touch(&self, hash: &str) -> Result<(), BackendError>;

    /// Playable URL for one file of a torrent.
    fn play_link(&self, hash: &str, file_id: &str) -> String;
}
