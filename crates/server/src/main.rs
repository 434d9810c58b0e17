use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use seekbot_core::{
    load_config, validate_config, Bot, BotSettings, CachedIndexer, Indexer, JackettIndexer,
    LinkResolver, MagnetResolver, QBittorrentClient, QueryLog, ResultCache, SearchOrchestrator,
    StreamingBackend, TorrServerClient, TorrentClient, TorrentInfoPoller,
};

use seekbot_server::api::{create_router, spawn_heartbeat, WsBroadcaster, WsOutbox};
use seekbot_server::state::AppState;

/// Interval between WebSocket heartbeats
const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(filter);

    if std::env::var("SEEKBOT_LOG_FORMAT").is_ok_and(|f| f == "json") {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

async fn run() -> Result<()> {
    init_logging();

    // Determine config path
    let config_path = std::env::var("SEEKBOT_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config.toml"));

    // Load configuration
    info!("Loading configuration from {:?}", config_path);
    let config = load_config(&config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    let config_json = serde_json::to_string(&config).unwrap_or_default();
    let config_hash = format!("{:x}", Sha256::digest(config_json.as_bytes()));
    info!(config_hash = %&config_hash[..16], "Configuration loaded successfully");

    // Indexer, with repeated queries answered from memory
    info!("Initializing Jackett indexer at {}", config.jackett.url);
    let jackett = JackettIndexer::new(config.jackett.clone())
        .context("Failed to create Jackett client")?;
    let indexer: Arc<dyn Indexer> = Arc::new(CachedIndexer::new(
        jackett,
        Duration::from_secs(config.jackett.cache_ttl_secs),
        config.jackett.cache_capacity,
    ));

    // Streaming backend
    info!("Initializing TorrServer client at {}", config.torrserver.url);
    let backend: Arc<dyn StreamingBackend> = Arc::new(
        TorrServerClient::new(&config.torrserver).context("Failed to create TorrServer client")?,
    );

    let resolver: Arc<dyn LinkResolver> = Arc::new(
        MagnetResolver::new(Duration::from_secs(config.jackett.timeout_secs as u64))
            .context("Failed to create magnet resolver")?,
    );

    // Optional download client
    let torrent_client: Option<Arc<dyn TorrentClient>> = match &config.qbittorrent {
        Some(qbit_config) => {
            info!("Initializing qBittorrent client at {}", qbit_config.url);
            Some(Arc::new(QBittorrentClient::new(qbit_config.clone())))
        }
        None => {
            info!("No qBittorrent client configured");
            None
        }
    };

    let query_log = QueryLog::from_config(&config.query_log);
    match &query_log {
        Some(log) => info!("Writing search queries to {:?}", log.path()),
        None => info!("Query log disabled"),
    }

    // Responses leave through the WebSocket stream
    let ws_broadcaster = WsBroadcaster::default();
    let outbox = Arc::new(WsOutbox::new(ws_broadcaster.clone()));
    let heartbeat = spawn_heartbeat(ws_broadcaster.clone(), HEARTBEAT_INTERVAL);

    let bot = Bot::new(
        SearchOrchestrator::new(indexer, config.search.clone()),
        ResultCache::new(&config.results),
        resolver,
        TorrentInfoPoller::new(backend, config.poller.clone()),
        outbox,
        BotSettings::from_config(&config),
    )
    .with_query_log(query_log);

    let state = Arc::new(AppState::new(
        config.clone(),
        Arc::new(bot),
        ws_broadcaster,
        torrent_client,
    ));

    let app = create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host, config.server.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    heartbeat.abort();
    info!("Server shut down");

    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
