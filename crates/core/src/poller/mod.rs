//! Torrent info poller.
//!
//! Hands a magnet link to the streaming backend and polls its metadata
//! endpoint until the file list shows up or the attempt budget runs out.

mod types;

pub use types::*;

use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::PollerConfig;
use crate::metrics::{POLL_ATTEMPTS, POLL_OUTCOMES};
use crate::streaming::StreamingBackend;

/// Continuation run when a poll sequence produces torrent info.
pub type OnSuccess = Box<dyn FnOnce(TorrentInfo) -> BoxFuture<'static, ()> + Send>;

/// Continuation run when a poll sequence fails.
pub type OnFailure = Box<dyn FnOnce(PollError) -> BoxFuture<'static, ()> + Send>;

#[derive(Clone)]
pub struct TorrentInfoPoller {
    backend: Arc<dyn StreamingBackend>,
    config: PollerConfig,
}

impl TorrentInfoPoller {
    pub fn new(backend: Arc<dyn StreamingBackend>, config: PollerConfig) -> Self {
        Self { backend, config }
    }

    pub fn backend(&self) -> &Arc<dyn StreamingBackend> {
        &self.backend
    }

    /// Poll until metadata is available. Not cancellable once started.
    pub async fn resolve(&self, magnet: &str) -> Result<TorrentInfo, PollError> {
        let result = self.poll(magnet).await;
        let outcome = match &result {
            Ok(_) => "success",
            Err(PollError::Exhausted { .. }) => "exhausted",
            Err(PollError::Backend(_)) => "backend_error",
        };
        POLL_OUTCOMES.with_label_values(&[outcome]).inc();
        result
    }

    /// Run [`resolve`](Self::resolve) on its own task.
    pub fn spawn(&self, magnet: impl Into<String>) -> JoinHandle<Result<TorrentInfo, PollError>> {
        let poller = self.clone();
        let magnet = magnet.into();
        tokio::spawn(async move { poller.resolve(&magnet).await })
    }

    /// Poll in the background and hand the outcome to a continuation.
    ///
    /// A failure without `on_failure` is only logged.
    pub fn resolve_with(
        &self,
        magnet: impl Into<String>,
        on_success: OnSuccess,
        on_failure: Option<OnFailure>,
    ) -> JoinHandle<()> {
        let poller = self.clone();
        let magnet = magnet.into();
        tokio::spawn(async move {
            match poller.resolve(&magnet).await {
                Ok(info) => on_success(info).await,
                Err(e) => match on_failure {
                    Some(on_failure) => on_failure(e).await,
                    None => warn!(error = %e, "Torrent info polling failed"),
                },
            }
        })
    }

    async fn poll(&self, magnet: &str) -> Result<TorrentInfo, PollError> {
        let interval = Duration::from_millis(self.config.interval_ms);
        let max_attempts = self.config.max_attempts;

        let mut hash = if self.config.readd_each_attempt {
            None
        } else {
            Some(self.backend.add_torrent(magnet).await?)
        };

        for attempt in 1..=max_attempts {
            if !self.config.poll_immediately {
                tokio::time::sleep(interval).await;
            }

            if self.config.readd_each_attempt {
                hash = Some(self.backend.add_torrent(magnet).await?);
            }
            let Some(current) = hash.as_deref() else {
                continue;
            };

            debug!(hash = %current, attempt, "Waiting for torrent info");
            match self.backend.torrent_metadata(current).await {
                Ok(Some(metadata)) if metadata.is_complete() => {
                    POLL_ATTEMPTS.observe(attempt as f64);
                    info!(hash = %current, attempt, files = metadata.files.len(), "Torrent info received");
                    return Ok(TorrentInfo::from_metadata(current, metadata));
                }
                Ok(_) => {}
                Err(e) => {
                    warn!(hash = %current, attempt, error = %e, "Torrent metadata request failed");
                }
            }

            if self.config.poll_immediately {
                tokio::time::sleep(interval).await;
            }
        }

        POLL_ATTEMPTS.observe(max_attempts as f64);
        warn!(attempts = max_attempts, "Failed to get torrent info");
        Err(PollError::Exhausted {
            attempts: max_attempts,
        })
    }
}
