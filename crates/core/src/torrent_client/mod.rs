//! Torrent client abstraction.
//!
//! An optional download target next to the streaming backend: results can be
//! handed to a qBittorrent instance for a regular download.

mod qbittorrent;
mod types;

pub use qbittorrent::QBittorrentClient;
pub use types::*;
