//! Torrent search abstraction.
//!
//! This module provides an `Indexer` trait for querying torrent indexers,
//! the Jackett implementation, and a caching decorator that keeps repeated
//! identical queries off the network for a short window.

mod cached;
mod jackett;
mod normalize;
mod types;

pub use cached::CachedIndexer;
pub use jackett::JackettIndexer;
pub use normalize::{normalize_query, MAX_QUERY_TEXT_LENGTH};
pub use types::*;
