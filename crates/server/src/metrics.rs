//! Prometheus metrics for the HTTP and WebSocket surface.
//!
//! The registry also carries the core's search, resolution and polling
//! metrics, so a single `/metrics` scrape covers the whole process.

use once_cell::sync::Lazy;
use prometheus::{
    core::Collector, Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge,
    Opts, Registry, TextEncoder,
};
use tracing::error;

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// HTTP
// =============================================================================

/// Request duration by route template. Update requests run a whole search,
/// so the buckets reach well past the slow-search delay.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "seekbot_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.001, 0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 15.0, 30.0, 60.0, 120.0,
        ]),
        &["method", "path", "status"],
    )
    .unwrap()
});

pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("seekbot_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "seekbot_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

// =============================================================================
// Chat adapter delivery
// =============================================================================

/// Chat adapters currently subscribed to the response stream.
pub static WS_CONNECTIONS_ACTIVE: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "seekbot_ws_connections_active",
        "Number of chat adapters connected over WebSocket",
    )
    .unwrap()
});

pub static WS_CONNECTIONS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "seekbot_ws_connections_total",
        "Total WebSocket connections since startup",
    )
    .unwrap()
});

/// Frames written to sockets, by message type (send, edit, heartbeat).
pub static WS_MESSAGES_SENT: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("seekbot_ws_messages_sent_total", "WebSocket frames sent"),
        &["type"],
    )
    .unwrap()
});

/// Responses dropped because an adapter fell behind the broadcast channel.
pub static WS_LAG_EVENTS: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "seekbot_ws_lag_events_total",
        "WebSocket lag events (adapter fell behind)",
    )
    .unwrap()
});

/// Outbox publications by operation and outcome.
pub static OUTBOX_DELIVERIES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "seekbot_outbox_deliveries_total",
            "Bot responses published to chat adapters",
        ),
        &["operation", "outcome"],
    )
    .unwrap()
});

// =============================================================================
// Torrent client hand-off
// =============================================================================

pub static TORRENT_CLIENT_ADDS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "seekbot_torrent_client_adds_total",
            "Search results handed to the download client",
        ),
        &["outcome"],
    )
    .unwrap()
});

fn server_metrics() -> Vec<Box<dyn Collector>> {
    vec![
        Box::new(HTTP_REQUEST_DURATION.clone()),
        Box::new(HTTP_REQUESTS_TOTAL.clone()),
        Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()),
        Box::new(WS_CONNECTIONS_ACTIVE.clone()),
        Box::new(WS_CONNECTIONS_TOTAL.clone()),
        Box::new(WS_MESSAGES_SENT.clone()),
        Box::new(WS_LAG_EVENTS.clone()),
        Box::new(OUTBOX_DELIVERIES.clone()),
        Box::new(TORRENT_CLIENT_ADDS.clone()),
    ]
}

fn register_metrics(registry: &Registry) {
    let collectors = server_metrics()
        .into_iter()
        .chain(seekbot_core::metrics::all_metrics());
    for collector in collectors {
        registry.register(collector).unwrap();
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        error!(error = %e, "Failed to encode metrics");
    }
    String::from_utf8(buffer).unwrap_or_default()
}
