//! Testing utilities and mock implementations.
//!
//! Mocks for every external collaborator of the bot, so whole interaction
//! flows can be driven without Jackett, TorrServer or a chat transport.
//!
//! # Example
//!
//! ```rust,ignore
//! use seekbot_core::testing::{fixtures, MockIndexer, MockStreamingBackend, RecordingOutbox};
//!
//! let indexer = MockIndexer::with_results(vec![fixtures::search_result("AAAAAA", 10)]);
//! let backend = MockStreamingBackend::new().ready_after(2, fixtures::metadata());
//! let outbox = RecordingOutbox::new();
//! ```

mod mock_indexer;
mod mock_resolver;
mod mock_streaming;
mod mock_torrent_client;
mod recording;

pub use mock_indexer::{CallCounter, MockIndexer};
pub use mock_resolver::MockResolver;
pub use mock_streaming::MockStreamingBackend;
pub use mock_torrent_client::MockTorrentClient;
pub use recording::{OutboxEvent, RecordingNotifier, RecordingOutbox};

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::poller::TorrentInfo;
    use crate::searcher::SearchResult;
    use crate::streaming::{BackendFile, TorrentMetadata};

    const GIB: u64 = 1024 * 1024 * 1024;

    /// Create a magnet-only search result with reasonable defaults.
    pub fn search_result(id: &str, seeds: u32) -> SearchResult {
        SearchResult::from_indexer(
            id.to_string(),
            format!("Result {}", id),
            Some(GIB),
            Some(seeds),
            Some(format!("magnet:?xt=urn:btih:{}", id.to_lowercase())),
            None,
            Some("mock-tracker".to_string()),
        )
    }

    /// Create a result that only carries a `.torrent` download URL.
    pub fn torrent_only_result(id: &str, torrent_url: &str) -> SearchResult {
        SearchResult::from_indexer(
            id.to_string(),
            format!("Result {}", id),
            Some(GIB),
            Some(1),
            None,
            Some(torrent_url.to_string()),
            Some("mock-tracker".to_string()),
        )
    }

    /// Create a result of the given size in bytes.
    pub fn sized_result(id: &str, size_bytes: u64) -> SearchResult {
        SearchResult::from_indexer(
            id.to_string(),
            format!("Result {}", id),
            Some(size_bytes),
            Some(1),
            Some(format!("magnet:?xt=urn:btih:{}", id.to_lowercase())),
            None,
            None,
        )
    }

    /// Backend metadata for a small movie torrent.
    pub fn metadata() -> TorrentMetadata {
        TorrentMetadata {
            title: "Movie".to_string(),
            torrent_size: Some(2 * GIB + 100),
            files: vec![
                BackendFile {
                    id: 2,
                    path: "Movie/sample.txt".to_string(),
                    length: Some(100),
                },
                BackendFile {
                    id: 1,
                    path: "Movie/movie.mkv".to_string(),
                    length: Some(2 * GIB),
                },
            ],
        }
    }

    /// Torrent info with `count` audio files of decreasing size.
    pub fn torrent_info_with_files(count: u64) -> TorrentInfo {
        let metadata = TorrentMetadata {
            title: "Album".to_string(),
            torrent_size: Some(count * 1024 * 1024),
            files: (1..=count)
                .map(|i| BackendFile {
                    id: i,
                    path: format!("Album/{:02}.flac", i),
                    length: Some((count + 1 - i) * 1024 * 1024),
                })
                .collect(),
        };
        TorrentInfo::from_metadata("mockhash", metadata)
    }
}
