//! Search orchestrator implementation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::time::Instant;
use tracing::{debug, error, info};

use crate::config::SearchConfig;
use crate::metrics::{SEARCH_DURATION, SEARCH_RESULTS, SLOW_SEARCH_NOTICES};
use crate::searcher::{normalize_query, Indexer, SearchError, SearchResult};

use super::types::{ExecutionTimes, SearchNotifier};

/// Runs indexer searches off the caller's path with a slow-search notification.
pub struct SearchOrchestrator {
    indexer: Arc<dyn Indexer>,
    config: SearchConfig,
    times: Arc<ExecutionTimes>,
}

impl SearchOrchestrator {
    pub fn new(indexer: Arc<dyn Indexer>, config: SearchConfig) -> Self {
        let times = Arc::new(ExecutionTimes::new(config.sample_window));
        Self::with_execution_times(indexer, config, times)
    }

    /// Create an orchestrator around an existing execution-time window.
    pub fn with_execution_times(
        indexer: Arc<dyn Indexer>,
        config: SearchConfig,
        times: Arc<ExecutionTimes>,
    ) -> Self {
        Self {
            indexer,
            config,
            times,
        }
    }

    pub fn execution_times(&self) -> &Arc<ExecutionTimes> {
        &self.times
    }

    /// Search for `query` and return results ordered by seeds.
    ///
    /// The indexer call and the notification timer run as two tasks. If the
    /// search is still pending when the timer fires, `notifier` receives a
    /// [`SlowSearchNotice`](super::SlowSearchNotice). Both tasks are joined
    /// before returning, search first. The notifier call itself runs on its
    /// own task and is not awaited.
    pub async fn search(
        &self,
        query: &str,
        notifier: Arc<dyn SearchNotifier>,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let normalized = normalize_query(query);
        let delay = Duration::from_secs(self.config.notify_delay_secs);
        let start = Instant::now();

        let pending = Arc::new(AtomicBool::new(true));
        let (done_tx, done_rx) = oneshot::channel::<()>();

        let search_task = {
            let indexer = Arc::clone(&self.indexer);
            let pending = Arc::clone(&pending);
            let query = normalized.clone();
            tokio::spawn(async move {
                let result = indexer.search(&query).await;
                pending.store(false, Ordering::SeqCst);
                let _ = done_tx.send(());
                result
            })
        };

        let notify_task = {
            let pending = Arc::clone(&pending);
            let times = Arc::clone(&self.times);
            let query = normalized.clone();
            tokio::spawn(async move {
                tokio::select! {
                    _ = done_rx => return,
                    _ = tokio::time::sleep(delay) => {}
                }

                if pending.load(Ordering::SeqCst) {
                    let notice = times.notice(delay);
                    info!(query = %query, ?notice, "Search is taking longer than expected");
                    SLOW_SEARCH_NOTICES.inc();
                    // Detached: a slow transport must not hold back the results
                    tokio::spawn(async move { notifier.slow_search(notice).await });
                }
            })
        };

        let result = search_task.await;
        if let Err(e) = notify_task.await {
            error!(error = %e, "Slow-search notification task failed");
        }

        let elapsed = start.elapsed();
        SEARCH_DURATION.observe(elapsed.as_secs_f64());
        if elapsed >= Duration::from_secs(self.config.slow_sample_floor_secs) {
            self.times.record(elapsed);
            debug!(query = %normalized, secs = elapsed.as_secs_f64(), "Recorded slow search duration");
        }

        let results = result.map_err(|e| SearchError::Internal(e.to_string()))??;
        SEARCH_RESULTS.observe(results.len() as f64);
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::SlowSearchNotice;
    use crate::testing::{fixtures, MockIndexer, RecordingNotifier};
    use async_trait::async_trait;

    /// Notifier whose delivery takes `latency` before it is recorded.
    struct SlowTransportNotifier {
        latency: Duration,
        delivered: RecordingNotifier,
    }

    #[async_trait]
    impl SearchNotifier for SlowTransportNotifier {
        async fn slow_search(&self, notice: SlowSearchNotice) {
            tokio::time::sleep(self.latency).await;
            self.delivered.slow_search(notice).await;
        }
    }

    fn config() -> SearchConfig {
        SearchConfig::default()
    }

    #[tokio::test(start_paused = true)]
    async fn test_fast_search_sends_no_notice() {
        let indexer = Arc::new(MockIndexer::with_results(vec![fixtures::search_result("AAAAAA", 1)]));
        let notifier = Arc::new(RecordingNotifier::new());
        let orchestrator = SearchOrchestrator::new(indexer, config());

        let results = orchestrator.search("Ubuntu", notifier.clone()).await.unwrap();

        assert_eq!(results.len(), 1);
        assert!(notifier.notices().is_empty());
        assert!(orchestrator.execution_times().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_search_notifies_once_and_records_duration() {
        let indexer = Arc::new(MockIndexer::new().with_delay(Duration::from_secs(20)));
        let notifier = Arc::new(RecordingNotifier::new());
        let orchestrator = SearchOrchestrator::new(indexer, config());
        let start = Instant::now();

        orchestrator.search("ubuntu", notifier.clone()).await.unwrap();

        assert_eq!(notifier.notices(), vec![SlowSearchNotice::TakesLonger]);
        assert_eq!(start.elapsed(), Duration::from_secs(20));
        assert_eq!(orchestrator.execution_times().average_secs(), 20);
    }

    #[tokio::test(start_paused = true)]
    async fn test_estimate_once_slow_searches_are_common() {
        let indexer = Arc::new(MockIndexer::new().with_delay(Duration::from_secs(30)));
        let notifier = Arc::new(RecordingNotifier::new());
        let orchestrator = SearchOrchestrator::new(indexer, config());

        orchestrator.search("first", notifier.clone()).await.unwrap();
        orchestrator.search("second", notifier.clone()).await.unwrap();

        assert_eq!(
            notifier.notices(),
            vec![
                SlowSearchNotice::TakesLonger,
                SlowSearchNotice::Estimated { average_secs: 30 }
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_medium_search_recorded_without_notice() {
        let indexer = Arc::new(MockIndexer::new().with_delay(Duration::from_secs(7)));
        let notifier = Arc::new(RecordingNotifier::new());
        let orchestrator = SearchOrchestrator::new(indexer, config());

        orchestrator.search("q", notifier.clone()).await.unwrap();

        assert!(notifier.notices().is_empty());
        assert_eq!(orchestrator.execution_times().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_query_is_normalized_before_search() {
        let indexer = Arc::new(MockIndexer::new());
        let orchestrator = SearchOrchestrator::new(indexer.clone(), config());

        orchestrator
            .search("  Ubuntu 24.04  ", Arc::new(RecordingNotifier::new()))
            .await
            .unwrap();

        assert_eq!(indexer.queries(), vec!["ubuntu 24.04".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_errors_propagate_after_join() {
        let indexer = Arc::new(MockIndexer::new().with_delay(Duration::from_secs(16)));
        indexer.fail_next(SearchError::Timeout);
        let notifier = Arc::new(RecordingNotifier::new());
        let orchestrator = SearchOrchestrator::new(indexer, config());

        let err = orchestrator.search("q", notifier.clone()).await.unwrap_err();

        assert!(matches!(err, SearchError::Timeout));
        assert_eq!(notifier.notices().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_notifier_does_not_delay_results() {
        let indexer = Arc::new(
            MockIndexer::with_results(vec![fixtures::search_result("AAAAAA", 1)])
                .with_delay(Duration::from_secs(16)),
        );
        let notifier = Arc::new(SlowTransportNotifier {
            latency: Duration::from_secs(30),
            delivered: RecordingNotifier::new(),
        });
        let orchestrator = SearchOrchestrator::new(indexer, config());
        let start = Instant::now();

        let results = orchestrator.search("ubuntu", notifier.clone()).await.unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(start.elapsed(), Duration::from_secs(16));
        assert!(notifier.delivered.notices().is_empty());

        // The notification still completes in the background
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(notifier.delivered.notices(), vec![SlowSearchNotice::TakesLonger]);
    }
}
