//! Result cache: expiring storage of search result sets by query fingerprint.
//!
//! Entries live for a fixed retention window and are evicted under capacity
//! pressure. Both happen passively inside the backing cache: a lookup on an
//! absent or expired fingerprint simply yields nothing.

mod fingerprint;

pub use fingerprint::fingerprint;

use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

use crate::config::ResultCacheConfig;
use crate::searcher::SearchResult;

type Entry = Arc<RwLock<Vec<SearchResult>>>;

/// Shared, process-scoped cache of result sets.
///
/// Cloning is cheap and every clone sees the same entries.
#[derive(Clone)]
pub struct ResultCache {
    entries: Cache<String, Entry>,
    fingerprint_len: usize,
}

impl ResultCache {
    pub fn new(config: &ResultCacheConfig) -> Self {
        Self::with_ttl(
            Duration::from_secs(config.ttl_secs),
            config.capacity,
            config.fingerprint_len,
        )
    }

    pub fn with_ttl(ttl: Duration, capacity: u64, fingerprint_len: usize) -> Self {
        let entries = Cache::builder()
            .max_capacity(capacity)
            .time_to_live(ttl)
            .build();
        Self {
            entries,
            fingerprint_len,
        }
    }

    /// Fingerprint of a normalized query under this cache's key length.
    pub fn fingerprint(&self, normalized_query: &str) -> String {
        fingerprint(normalized_query, self.fingerprint_len)
    }

    /// Store a result set, replacing any previous set under the same fingerprint.
    pub async fn put(&self, fingerprint: &str, results: Vec<SearchResult>) {
        debug!(fingerprint = %fingerprint, results = results.len(), "Caching result set");
        self.entries
            .insert(fingerprint.to_string(), Arc::new(RwLock::new(results)))
            .await;
    }

    /// The ordered result set for a fingerprint, empty when unknown or expired.
    pub async fn get_by_fingerprint(&self, fingerprint: &str) -> Vec<SearchResult> {
        match self.entries.get(fingerprint).await {
            Some(entry) => entry.read().await.clone(),
            None => Vec::new(),
        }
    }

    /// One result of a set, `None` when the set expired or the id is stale.
    pub async fn get_item(&self, fingerprint: &str, item_id: &str) -> Option<SearchResult> {
        let entry = self.entries.get(fingerprint).await?;
        let results = entry.read().await;
        results.iter().find(|r| r.id == item_id).cloned()
    }

    /// Mutate one cached result in place and return its updated copy.
    ///
    /// The entry keeps its original expiry.
    pub async fn update_item<F>(
        &self,
        fingerprint: &str,
        item_id: &str,
        mutator: F,
    ) -> Option<SearchResult>
    where
        F: FnOnce(&mut SearchResult),
    {
        let entry = self.entries.get(fingerprint).await?;
        let mut results = entry.write().await;
        let item = results.iter_mut().find(|r| r.id == item_id)?;
        mutator(item);
        Some(item.clone())
    }

    /// Approximate number of live result sets.
    pub fn entry_count(&self) -> u64 {
        self.entries.entry_count()
    }
}
