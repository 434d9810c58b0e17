//! Search orchestration.
//!
//! Runs an indexer search on its own task and races it against a delayed
//! "still searching" notification. Slow search durations feed a rolling
//! window that picks the notification text.

mod runner;
mod types;

pub use runner::SearchOrchestrator;
pub use types::{ExecutionTimes, SearchNotifier, SlowSearchNotice};
