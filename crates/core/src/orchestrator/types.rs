//! Types for the search orchestrator.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;

/// Text variant for the "search is taking a while" notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SlowSearchNotice {
    /// Searches are usually faster than the notification delay.
    TakesLonger,
    /// Slow searches usually take about this long.
    Estimated { average_secs: u64 },
}

/// Receives the slow-search notification while a search is still running.
#[async_trait]
pub trait SearchNotifier: Send + Sync {
    async fn slow_search(&self, notice: SlowSearchNotice);
}

/// Rolling window of recent slow search durations.
///
/// Shared by every concurrent search; the oldest sample is dropped once the
/// window is full.
#[derive(Debug)]
pub struct ExecutionTimes {
    samples: Mutex<VecDeque<Duration>>,
    capacity: usize,
}

impl ExecutionTimes {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity: capacity.max(1),
        }
    }

    pub fn record(&self, duration: Duration) {
        let mut samples = self.lock();
        if samples.len() == self.capacity {
            samples.pop_front();
        }
        samples.push_back(duration);
    }

    /// Rounded mean of the window in seconds, `0` while empty.
    pub fn average_secs(&self) -> u64 {
        let samples = self.lock();
        if samples.is_empty() {
            return 0;
        }
        let total: f64 = samples.iter().map(Duration::as_secs_f64).sum();
        (total / samples.len() as f64).round() as u64
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pick the notification variant for a search that outlived `delay`.
    pub fn notice(&self, delay: Duration) -> SlowSearchNotice {
        let average_secs = self.average_secs();
        if average_secs < delay.as_secs() {
            SlowSearchNotice::TakesLonger
        } else {
            SlowSearchNotice::Estimated { average_secs }
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<Duration>> {
        self.samples
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for ExecutionTimes {
    fn default() -> Self {
        Self::new(5)
    }
}
