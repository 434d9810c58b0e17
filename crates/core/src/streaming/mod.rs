//! Streaming-torrent backend abstraction.
//!
//! The backend fetches torrents from peers and exposes individual files over
//! HTTP. `TorrServerClient` is the concrete implementation.

mod keepalive;
mod torrserver;
mod types;

pub use keepalive::spawn_keep_alive;
pub use torrserver::{advertised_link, TorrServerClient};
pub use types::*;
