pub mod bot;
pub mod cache;
pub mod config;
pub mod magnet;
pub mod messages;
pub mod metrics;
pub mod orchestrator;
pub mod poller;
pub mod presentation;
pub mod query_log;
pub mod searcher;
pub mod streaming;
pub mod testing;
pub mod torrent_client;

pub use bot::{Bot, BotError, BotSettings, Command, Outbox, OutboxError, Update};
pub use cache::ResultCache;
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SanitizedConfig,
};
pub use magnet::{LinkResolver, MagnetResolver, ResolveError, ResolvedMagnet};
pub use orchestrator::{SearchNotifier, SearchOrchestrator, SlowSearchNotice};
pub use poller::{PollError, TorrentInfo, TorrentInfoPoller};
pub use presentation::{SizeFilter, UserResponse};
pub use query_log::QueryLog;
pub use searcher::{CachedIndexer, Indexer, JackettIndexer, SearchError, SearchResult};
pub use streaming::{StreamingBackend, TorrServerClient};
pub use torrent_client::{QBittorrentClient, TorrentClient, TorrentClientError};
