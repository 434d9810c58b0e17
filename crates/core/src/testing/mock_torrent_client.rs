//! Mock torrent client for testing.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::torrent_client::{AddTorrentRequest, TorrentClient, TorrentClientError};

/// Mock implementation of the TorrentClient trait.
///
/// Records every accepted request; can be switched to reject adds.
#[derive(Debug, Default)]
pub struct MockTorrentClient {
    added: Mutex<Vec<AddTorrentRequest>>,
    fail: Mutex<Option<String>>,
}

impl MockTorrentClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following add fail with an API error.
    pub fn fail_with(&self, message: impl Into<String>) {
        *self.fail.lock().unwrap() = Some(message.into());
    }

    pub fn added(&self) -> Vec<AddTorrentRequest> {
        self.added.lock().unwrap().clone()
    }
}

#[async_trait]
impl TorrentClient for MockTorrentClient {
    fn name(&self) -> &str {
        "mock"
    }

    async fn add_torrent(&self, request: AddTorrentRequest) -> Result<(), TorrentClientError> {
        if let Some(message) = self.fail.lock().unwrap().clone() {
            return Err(TorrentClientError::ApiError(message));
        }
        self.added.lock().unwrap().push(request);
        Ok(())
    }
}
