use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::presentation::binary_size;
use crate::streaming::{BackendError, TorrentMetadata};

/// Errors that end a polling sequence.
#[derive(Debug, Clone, Error)]
pub enum PollError {
    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error("No torrent metadata after {attempts} attempts")]
    Exhausted { attempts: u32 },
}

/// A file inside a resolved torrent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TorrentFileInfo {
    /// Backend file id, used in play links.
    pub id: String,
    /// Path of the file inside the torrent.
    pub title: String,
    /// Human-readable size.
    pub size: String,
    pub size_bytes: Option<u64>,
}

/// Torrent metadata ready for presentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TorrentInfo {
    pub hash: String,
    pub title: String,
    /// Human-readable total size.
    pub total_size: String,
    /// Files ordered by size, largest first.
    pub files: Vec<TorrentFileInfo>,
}

impl TorrentInfo {
    pub fn from_metadata(hash: impl Into<String>, metadata: TorrentMetadata) -> Self {
        let mut files: Vec<TorrentFileInfo> = metadata
            .files
            .into_iter()
            .map(|f| TorrentFileInfo {
                id: f.id.to_string(),
                title: f.path,
                size: binary_size(f.length),
                size_bytes: f.length,
            })
            .collect();
        files.sort_by(|a, b| b.size_bytes.cmp(&a.size_bytes));

        Self {
            hash: hash.into(),
            title: metadata.title,
            total_size: binary_size(metadata.torrent_size),
            files,
        }
    }

    pub fn file(&self, id: &str) -> Option<&TorrentFileInfo> {
        self.files.iter().find(|f| f.id == id)
    }
}
