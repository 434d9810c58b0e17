//! Short-lived deduplication of identical indexer queries.

use async_trait::async_trait;
use moka::future::Cache;
use std::time::Duration;
use tracing::debug;

use crate::metrics::{INDEXER_CACHE_HITS, INDEXER_CACHE_MISSES};

use super::{Indexer, SearchError, SearchResult};

/// Wraps an [`Indexer`] and answers repeated queries from memory.
///
/// Entries are keyed by the MD5 of the query text. Concurrent identical
/// queries share one upstream call. Failed searches are not cached.
pub struct CachedIndexer<I> {
    inner: I,
    cache: Cache<String, Vec<SearchResult>>,
}

impl<I: Indexer> CachedIndexer<I> {
    pub fn new(inner: I, ttl: Duration, capacity: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(capacity)
            .time_to_live(ttl)
            .build();
        Self { inner, cache }
    }

    /// The wrapped indexer.
    pub fn inner(&self) -> &I {
        &self.inner
    }
}

fn cache_key(query: &str) -> String {
    format!("{:x}", md5::compute(query.as_bytes()))
}

#[async_trait]
impl<I: Indexer> Indexer for CachedIndexer<I> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, SearchError> {
        let key = cache_key(query);

        if let Some(results) = self.cache.get(&key).await {
            debug!(query = %query, "Indexer cache hit");
            INDEXER_CACHE_HITS.inc();
            return Ok(results);
        }

        INDEXER_CACHE_MISSES.inc();
        self.cache
            .try_get_with(key, self.inner.search(query))
            .await
            .map_err(|e| (*e).clone())
    }
}
