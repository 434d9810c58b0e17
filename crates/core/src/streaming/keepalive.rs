use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, trace};

use super::StreamingBackend;

/// Keep a torrent warm on the backend by touching it periodically.
///
/// Runs until `duration` has elapsed and cannot be cancelled. Touch failures
/// are logged and the loop carries on. Resolves to the number of touches made.
pub fn spawn_keep_alive(
    backend: Arc<dyn StreamingBackend>,
    hash: String,
    duration: Duration,
    interval: Duration,
) -> JoinHandle<u32> {
    tokio::spawn(async move {
        let start = Instant::now();
        let mut touches = 0u32;

        while start.elapsed() < duration {
            if let Err(e) = backend.touch(&hash).await {
                debug!(hash = %hash, error = %e, "Keep-alive touch failed");
            }
            touches += 1;
            trace!(hash = %hash, touches, "Keep-alive touch");
            tokio::time::sleep(interval).await;
        }

        debug!(hash = %hash, touches, "Keep-alive finished");
        touches
    })
}
