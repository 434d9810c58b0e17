//! Mock magnet resolver for testing.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::magnet::{LinkResolver, ResolveError, ResolvedMagnet};

use super::CallCounter;

/// Mock implementation of the LinkResolver trait, answering per URL.
///
/// URLs without a configured outcome fail with a download error.
#[derive(Debug, Default)]
pub struct MockResolver {
    outcomes: Mutex<HashMap<String, Result<ResolvedMagnet, ResolveError>>>,
    calls: CallCounter,
}

impl MockResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_outcome(
        self,
        url: impl Into<String>,
        outcome: Result<ResolvedMagnet, ResolveError>,
    ) -> Self {
        self.outcomes.lock().unwrap().insert(url.into(), outcome);
        self
    }

    pub fn call_counter(&self) -> CallCounter {
        self.calls.clone()
    }
}

#[async_trait]
impl LinkResolver for MockResolver {
    async fn resolve(&self, torrent_file_url: &str) -> Result<ResolvedMagnet, ResolveError> {
        self.calls.increment();
        self.outcomes
            .lock()
            .unwrap()
            .get(torrent_file_url)
            .cloned()
            .unwrap_or_else(|| Err(ResolveError::Download("HTTP 404 Not Found".to_string())))
    }
}
