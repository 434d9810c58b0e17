pub mod handlers;
pub mod middleware;
pub mod qbittorrent;
pub mod routes;
pub mod updates;
pub mod ws;

pub use routes::create_router;
pub use ws::{spawn_heartbeat, WsBroadcaster, WsMessage, WsOutbox};
