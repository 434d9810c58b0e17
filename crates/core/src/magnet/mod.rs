//! Magnet link derivation.
//!
//! Turns a `.torrent` download URL into a magnet link, either by following a
//! redirect that already points at a magnet URI or by hashing the torrent's
//! bencoded `info` dictionary.

mod info_hash;
mod resolver;

pub use info_hash::{info_hash, magnet_from_torrent};
pub use resolver::MagnetResolver;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur while deriving a magnet link.
#[derive(Debug, Clone, Error)]
pub enum ResolveError {
    #[error("Error downloading torrent file: {0}")]
    Download(String),

    #[error("Error decoding torrent: {0}")]
    Decode(String),
}

/// Outcome of resolving a torrent file URL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedMagnet {
    /// The magnet link, empty when there was nothing to resolve.
    pub magnet: String,
    /// Whether the link was computed from downloaded torrent bytes.
    pub from_file: bool,
    /// Raw `.torrent` bytes, only present when `from_file` is set.
    pub torrent_bytes: Vec<u8>,
}

impl ResolvedMagnet {
    pub fn empty() -> Self {
        Self::default()
    }

    /// A magnet link obtained without downloading any torrent bytes.
    pub fn direct(magnet: impl Into<String>) -> Self {
        Self {
            magnet: magnet.into(),
            from_file: false,
            torrent_bytes: Vec::new(),
        }
    }
}

/// Resolves `.torrent` URLs into magnet links.
#[async_trait]
pub trait LinkResolver: Send + Sync {
    async fn resolve(&self, torrent_file_url: &str) -> Result<ResolvedMagnet, ResolveError>;
}
