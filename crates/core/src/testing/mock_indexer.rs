//! Mock indexer for testing.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::searcher::{Indexer, SearchError, SearchResult};

/// Shared handle counting calls into a mock.
#[derive(Debug, Clone, Default)]
pub struct CallCounter(Arc<AtomicUsize>);

impl CallCounter {
    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }

    pub(crate) fn increment(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

/// Mock implementation of the Indexer trait.
///
/// Returns the configured results after an optional delay, records every
/// query and counts calls. A single error can be injected with
/// [`fail_next`](Self::fail_next).
///
/// # Example
///
/// ```rust,ignore
/// let indexer = MockIndexer::with_results(vec![fixtures::search_result("AAAAAA", 10)])
///     .with_delay(Duration::from_secs(20));
/// let calls = indexer.call_counter();
/// ```
#[derive(Debug, Default)]
pub struct MockIndexer {
    results: Mutex<Vec<SearchResult>>,
    next_error: Mutex<Option<SearchError>>,
    queries: Mutex<Vec<String>>,
    delay: Option<Duration>,
    calls: CallCounter,
}

impl MockIndexer {
    /// Create a mock indexer with empty results.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock indexer with predefined results.
    pub fn with_results(results: Vec<SearchResult>) -> Self {
        let indexer = Self::new();
        indexer.set_results(results);
        indexer
    }

    /// Delay every search by `delay`.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn set_results(&self, results: Vec<SearchResult>) {
        *self.results.lock().unwrap() = results;
    }

    /// Configure the next search to fail with the given error.
    pub fn fail_next(&self, error: SearchError) {
        *self.next_error.lock().unwrap() = Some(error);
    }

    pub fn call_counter(&self) -> CallCounter {
        self.calls.clone()
    }

    /// Queries received so far, in order.
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl Indexer for MockIndexer {
    fn name(&self) -> &str {
        "mock"
    }

    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, SearchError> {
        self.calls.increment();
        self.queries.lock().unwrap().push(query.to_string());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(err) = self.next_error.lock().unwrap().take() {
            return Err(err);
        }

        Ok(self.results.lock().unwrap().clone())
    }
}
