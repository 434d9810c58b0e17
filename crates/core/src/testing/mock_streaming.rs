//! Mock streaming backend for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::streaming::{BackendError, StreamingBackend, TorrentMetadata};

/// Mock implementation of the StreamingBackend trait.
///
/// Metadata becomes available on the n-th metadata call when configured with
/// [`ready_after`](Self::ready_after), and never otherwise.
#[derive(Debug)]
pub struct MockStreamingBackend {
    hash: String,
    ready: Option<(usize, TorrentMetadata)>,
    fail_add: bool,
    fail_touch: bool,
    added: Mutex<Vec<String>>,
    metadata_calls: AtomicUsize,
    touches: Mutex<HashMap<String, usize>>,
}

impl Default for MockStreamingBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockStreamingBackend {
    pub fn new() -> Self {
        Self {
            hash: "mockhash".to_string(),
            ready: None,
            fail_add: false,
            fail_touch: false,
            added: Mutex::new(Vec::new()),
            metadata_calls: AtomicUsize::new(0),
            touches: Mutex::new(HashMap::new()),
        }
    }

    /// Hash returned by `add_torrent`.
    pub fn with_hash(mut self, hash: impl Into<String>) -> Self {
        self.hash = hash.into();
        self
    }

    /// Serve `metadata` from the `calls`-th metadata request onwards.
    pub fn ready_after(mut self, calls: usize, metadata: TorrentMetadata) -> Self {
        self.ready = Some((calls, metadata));
        self
    }

    pub fn failing_add(mut self) -> Self {
        self.fail_add = true;
        self
    }

    pub fn failing_touch(mut self) -> Self {
        self.fail_touch = true;
        self
    }

    /// Magnet links passed to `add_torrent`, in order.
    pub fn added_links(&self) -> Vec<String> {
        self.added.lock().unwrap().clone()
    }

    pub fn metadata_calls(&self) -> usize {
        self.metadata_calls.load(Ordering::SeqCst)
    }

    pub fn touch_count(&self, hash: &str) -> usize {
        self.touches.lock().unwrap().get(hash).copied().unwrap_or(0)
    }
}

#[async_trait]
impl StreamingBackend for MockStreamingBackend {
    fn name(&self) -> &str {
        "mock"
    }

    async fn add_torrent(&self, magnet: &str) -> Result<String, BackendError> {
        if self.fail_add {
            return Err(BackendError::Unavailable("mock add failure".to_string()));
        }
        self.added.lock().unwrap().push(magnet.to_string());
        Ok(self.hash.clone())
    }

    async fn torrent_metadata(&self, _hash: &str) -> Result<Option<TorrentMetadata>, BackendError> {
        let call = self.metadata_calls.fetch_add(1, Ordering::SeqCst) + 1;
        match &self.ready {
            Some((after, metadata)) if call >= *after => Ok(Some(metadata.clone())),
            _ => Ok(None),
        }
    }

    async fn touch(&self, hash: &str) -> Result<(), BackendError> {
        *self
            .touches
            .lock()
            .unwrap()
            .entry(hash.to_string())
            .or_insert(0) += 1;
        if self.fail_touch {
            return Err(BackendError::Timeout);
        }
        Ok(())
    }

    fn play_link(&self, hash: &str, file_id: &str) -> String {
        format!("http://torrserver.local/play/{}/{}", hash, file_id)
    }
}
