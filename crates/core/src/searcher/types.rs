//! Types for the torrent search system.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::presentation::natural_size;

/// Alphabet of result identifiers.
const ID_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Length of a result identifier.
pub const RESULT_ID_LEN: usize = 6;

/// A single indexer hit, addressable inside its result set by `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Short identifier, unique within the batch it was parsed in.
    pub id: String,
    pub title: String,
    /// Size in bytes, if the indexer reported one.
    pub size_bytes: Option<u64>,
    /// Human-readable size.
    pub size: String,
    pub seeds: Option<u32>,
    /// Magnet URI as reported by the indexer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub magnet: Option<String>,
    /// .torrent download URL as reported by the indexer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub torrent: Option<String>,
    /// Tracker (indexer) name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracker: Option<String>,
    /// Magnet link worked out on first selection, memoized for the cache lifetime.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub computed_magnet: Option<String>,
}

impl SearchResult {
    /// Build a result from raw indexer fields.
    ///
    /// A `torrent` link using the magnet scheme is moved to `magnet` (unless the
    /// indexer already gave one) so `torrent` only ever holds a fetchable URL.
    pub fn from_indexer(
        id: String,
        title: String,
        size_bytes: Option<u64>,
        seeds: Option<u32>,
        magnet: Option<String>,
        torrent: Option<String>,
        tracker: Option<String>,
    ) -> Self {
        let magnet = magnet.filter(|m| !m.is_empty());
        let torrent = torrent.filter(|t| !t.is_empty());

        let (magnet, torrent) = match torrent {
            Some(link) if link.starts_with("magnet:") => (magnet.or(Some(link)), None),
            other => (magnet, other),
        };

        Self {
            id,
            title,
            size_bytes,
            size: natural_size(size_bytes),
            seeds,
            magnet,
            torrent,
            tracker,
            computed_magnet: None,
        }
    }
}

/// Generate identifiers for a batch of `count` results, unique within the batch.
pub fn generate_ids(count: usize) -> Vec<String> {
    let mut ids: Vec<String> = Vec::with_capacity(count);
    while ids.len() < count {
        let id = random_id();
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    ids
}

fn random_id() -> String {
    uuid::Uuid::new_v4()
        .as_bytes()
        .iter()
        .take(RESULT_ID_LEN)
        .map(|b| ID_ALPHABET[*b as usize % ID_ALPHABET.len()] as char)
        .collect()
}

/// Sort results by seeds, most seeded first. Results without a seed count go
/// last; ties keep their indexer order.
pub fn sort_by_seeds(results: &mut [SearchResult]) {
    results.sort_by(|a, b| match (a.seeds, b.seeds) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
}

/// Errors that can occur during search operations.
#[derive(Debug, Clone, Error)]
pub enum SearchError {
    #[error("Search backend connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Search backend API error: {0}")]
    ApiError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Trait for torrent indexer backends.
#[async_trait]
pub trait Indexer: Send + Sync {
    /// Provider name for logging.
    fn name(&self) -> &str;

    /// Run a free-text query, returning results sorted by seeds.
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, SearchError>;
}
