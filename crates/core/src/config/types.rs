use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    pub jackett: JackettConfig,
    pub torrserver: TorrServerConfig,
    #[serde(default)]
    pub qbittorrent: Option<QBittorrentConfig>,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub results: ResultCacheConfig,
    #[serde(default)]
    pub poller: PollerConfig,
    #[serde(default)]
    pub presentation: PresentationConfig,
    #[serde(default)]
    pub query_log: QueryLogConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    8080
}

/// Jackett indexer configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JackettConfig {
    /// Jackett server URL (e.g., "http://localhost:9117")
    pub url: String,
    /// Jackett API key
    pub api_key: String,
    /// Request timeout in seconds (default: 120)
    #[serde(default = "default_jackett_timeout")]
    pub timeout_secs: u32,
    /// How long identical queries are answered from memory (default: 900)
    #[serde(default = "default_indexer_cache_ttl")]
    pub cache_ttl_secs: u64,
    /// Maximum number of distinct queries remembered (default: 50)
    #[serde(default = "default_indexer_cache_capacity")]
    pub cache_capacity: u64,
}

fn default_jackett_timeout() -> u32 {
    120
}

fn default_indexer_cache_ttl() -> u64 {
    900
}

fn default_indexer_cache_capacity() -> u64 {
    50
}

/// TorrServer streaming backend configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TorrServerConfig {
    /// Internal TorrServer URL used for API calls (e.g., "http://torrserver:8090")
    pub url: String,
    /// Public host put in front of play links handed to users.
    /// Falls back to `url` when unset.
    #[serde(default)]
    pub advertised_host: Option<String>,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_torrserver_timeout")]
    pub timeout_secs: u32,
    /// How long a torrent is kept warm after a link was handed out (default: 180)
    #[serde(default = "default_keep_alive_secs")]
    pub keep_alive_secs: u64,
    /// Interval between keep-alive touches in milliseconds (default: 2000)
    #[serde(default = "default_keep_alive_interval")]
    pub keep_alive_interval_ms: u64,
}

fn default_torrserver_timeout() -> u32 {
    30
}

fn default_keep_alive_secs() -> u64 {
    180
}

fn default_keep_alive_interval() -> u64 {
    2000
}

/// qBittorrent alternate backend configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QBittorrentConfig {
    /// qBittorrent Web UI URL (e.g., "http://localhost:8080")
    pub url: String,
    pub username: String,
    pub password: String,
    /// Tag applied to every added torrent
    #[serde(default = "default_qbittorrent_tag")]
    pub tag: String,
    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_torrserver_timeout")]
    pub timeout_secs: u32,
}

fn default_qbittorrent_tag() -> String {
    "default".to_string()
}

/// Search orchestration configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    /// Delay before the "taking longer than expected" notice (default: 15)
    #[serde(default = "default_notify_delay")]
    pub notify_delay_secs: u64,
    /// Searches faster than this are not recorded in the statistics (default: 5)
    #[serde(default = "default_slow_sample_floor")]
    pub slow_sample_floor_secs: u64,
    /// How many slow search durations are averaged (default: 5)
    #[serde(default = "default_sample_window")]
    pub sample_window: usize,
}

fn default_notify_delay() -> u64 {
    15
}

fn default_slow_sample_floor() -> u64 {
    5
}

fn default_sample_window() -> usize {
    5
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            notify_delay_secs: default_notify_delay(),
            slow_sample_floor_secs: default_slow_sample_floor(),
            sample_window: default_sample_window(),
        }
    }
}

/// Result cache configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResultCacheConfig {
    /// Retention of a search result set in seconds (default: 30 days)
    #[serde(default = "default_results_ttl")]
    pub ttl_secs: u64,
    /// Maximum number of cached result sets (default: 10000)
    #[serde(default = "default_results_capacity")]
    pub capacity: u64,
    /// Number of hex characters of the query hash used as fingerprint (default: 6)
    #[serde(default = "default_fingerprint_len")]
    pub fingerprint_len: usize,
}

fn default_results_ttl() -> u64 {
    30 * 24 * 60 * 60
}

fn default_results_capacity() -> u64 {
    10_000
}

fn default_fingerprint_len() -> usize {
    6
}

impl Default for ResultCacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_results_ttl(),
            capacity: default_results_capacity(),
            fingerprint_len: default_fingerprint_len(),
        }
    }
}

/// Torrent metadata polling configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PollerConfig {
    /// Maximum number of metadata polls (default: 15)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Delay between polls in milliseconds (default: 1000)
    #[serde(default = "default_poll_interval")]
    pub interval_ms: u64,
    /// Re-submit the magnet link before every poll instead of once (default: false)
    #[serde(default)]
    pub readd_each_attempt: bool,
    /// Poll right after adding instead of waiting one interval first (default: true)
    #[serde(default = "default_true")]
    pub poll_immediately: bool,
}

fn default_max_attempts() -> u32 {
    15
}

fn default_poll_interval() -> u64 {
    1000
}

fn default_true() -> bool {
    true
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            interval_ms: default_poll_interval(),
            readd_each_attempt: false,
            poll_immediately: true,
        }
    }
}

/// Presentation configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PresentationConfig {
    /// Maximum size of a single rendered message in characters (default: 4096)
    #[serde(default = "default_message_budget")]
    pub message_budget: usize,
    /// Maximum number of files listed for a torrent (default: 25)
    #[serde(default = "default_file_list_limit")]
    pub file_list_limit: usize,
    /// Optional page that renders a clickable magnet link. The hex-encoded
    /// anchor is passed as `content`. Magnet links are used directly when unset.
    #[serde(default)]
    pub magnet_page_url: Option<String>,
}

fn default_message_budget() -> usize {
    4096
}

fn default_file_list_limit() -> usize {
    25
}

impl Default for PresentationConfig {
    fn default() -> Self {
        Self {
            message_budget: default_message_budget(),
            file_list_limit: default_file_list_limit(),
            magnet_page_url: None,
        }
    }
}

/// Query log configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QueryLogConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_query_log_path")]
    pub path: PathBuf,
}

fn default_query_log_path() -> PathBuf {
    PathBuf::from("logs/query_log.txt")
}

impl Default for QueryLogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: default_query_log_path(),
        }
    }
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub jackett: SanitizedJackettConfig,
    pub torrserver: TorrServerConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qbittorrent: Option<SanitizedQBittorrentConfig>,
    pub search: SearchConfig,
    pub results: ResultCacheConfig,
    pub poller: PollerConfig,
    pub presentation: PresentationConfig,
    pub query_log: QueryLogConfig,
}

/// Sanitized Jackett config (API key hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedJackettConfig {
    pub url: String,
    pub api_key_configured: bool,
    pub timeout_secs: u32,
    pub cache_ttl_secs: u64,
}

/// Sanitized qBittorrent config (password hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedQBittorrentConfig {
    pub url: String,
    pub username: String,
    pub password_configured: bool,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            jackett: SanitizedJackettConfig {
                url: config.jackett.url.clone(),
                api_key_configured: !config.jackett.api_key.is_empty(),
                timeout_secs: config.jackett.timeout_secs,
                cache_ttl_secs: config.jackett.cache_ttl_secs,
            },
            torrserver: config.torrserver.clone(),
            qbittorrent: config
                .qbittorrent
                .as_ref()
                .map(|q| SanitizedQBittorrentConfig {
                    url: q.url.clone(),
                    username: q.username.clone(),
                    password_configured: !q.password.is_empty(),
                }),
            search: config.search.clone(),
            results: config.results.clone(),
            poller: config.poller.clone(),
            presentation: config.presentation.clone(),
            query_log: config.query_log.clone(),
        }
    }
}
