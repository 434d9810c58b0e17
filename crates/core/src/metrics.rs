//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Searches (duration, result counts, slow-search notices, indexer cache)
//! - Magnet resolution outcomes
//! - Torrent info polling
//! - Bot updates

use once_cell::sync::Lazy;
use prometheus::{Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Search Metrics
// =============================================================================

/// Search duration in seconds, including the notification join.
pub static SEARCH_DURATION: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new("seekbot_search_duration_seconds", "Duration of searches")
            .buckets(vec![0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 15.0, 30.0, 60.0, 120.0]),
    )
    .unwrap()
});

/// Search results returned from the indexer.
pub static SEARCH_RESULTS: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "seekbot_search_results",
            "Number of search results returned per query",
        )
        .buckets(vec![0.0, 1.0, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0]),
    )
    .unwrap()
});

/// Slow-search notices sent.
pub static SLOW_SEARCH_NOTICES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "seekbot_slow_search_notices_total",
        "Total slow-search notifications sent",
    )
    .unwrap()
});

/// Indexer cache hits.
pub static INDEXER_CACHE_HITS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("seekbot_indexer_cache_hits_total", "Total indexer cache hits").unwrap()
});

/// Indexer cache misses.
pub static INDEXER_CACHE_MISSES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "seekbot_indexer_cache_misses_total",
        "Total indexer cache misses",
    )
    .unwrap()
});

// =============================================================================
// Magnet Metrics
// =============================================================================

/// Magnet resolutions by outcome.
pub static MAGNET_RESOLUTIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "seekbot_magnet_resolutions_total",
            "Total magnet link resolutions",
        ),
        &["outcome"], // "empty", "redirect", "derived", "download_error", "decode_error"
    )
    .unwrap()
});

// =============================================================================
// Poller Metrics
// =============================================================================

/// Poll sequences by outcome.
pub static POLL_OUTCOMES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "seekbot_torrent_info_polls_total",
            "Total torrent info poll sequences",
        ),
        &["result"], // "success", "exhausted", "backend_error"
    )
    .unwrap()
});

/// Attempts needed per poll sequence.
pub static POLL_ATTEMPTS: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "seekbot_torrent_info_poll_attempts",
            "Metadata requests made per poll sequence",
        )
        .buckets(vec![1.0, 2.0, 3.0, 5.0, 10.0, 15.0, 20.0]),
    )
    .unwrap()
});

// =============================================================================
// Bot Metrics
// =============================================================================

/// Updates handled by kind.
pub static BOT_UPDATES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("seekbot_bot_updates_total", "Total bot updates handled"),
        &["kind"], // "start", "search", "select", "file", "filter", "invalid"
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Search
        Box::new(SEARCH_DURATION.clone()),
        Box::new(SEARCH_RESULTS.clone()),
        Box::new(SLOW_SEARCH_NOTICES.clone()),
        Box::new(INDEXER_CACHE_HITS.clone()),
        Box::new(INDEXER_CACHE_MISSES.clone()),
        // Magnet
        Box::new(MAGNET_RESOLUTIONS.clone()),
        // Poller
        Box::new(POLL_OUTCOMES.clone()),
        Box::new(POLL_ATTEMPTS.clone()),
        // Bot
        Box::new(BOT_UPDATES.clone()),
    ]
}
