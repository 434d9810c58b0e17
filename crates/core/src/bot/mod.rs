//! Interaction layer.
//!
//! Turns chat updates into searches, selections and file links, and hands
//! every reply to an [`Outbox`] as a transport-neutral [`UserResponse`].

mod commands;
mod outbox;

pub use commands::{parse_callback, parse_text, Command};
pub use outbox::{MessageId, Outbox, OutboxError, OutboxNotifier};

use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::cache::ResultCache;
use crate::config::Config;
use crate::magnet::LinkResolver;
use crate::messages;
use crate::metrics::BOT_UPDATES;
use crate::orchestrator::SearchOrchestrator;
use crate::poller::{PollError, TorrentInfo, TorrentInfoPoller};
use crate::presentation::{
    apply_filter, render_download_link, render_file_list, render_info_not_found, render_results,
    render_selection, SizeFilter, UserResponse,
};
use crate::query_log::QueryLog;
use crate::searcher::{normalize_query, SearchResult};
use crate::streaming::{advertised_link, spawn_keep_alive};

/// Errors surfaced by [`Bot::handle_update`].
///
/// Missing selections are answered with a message to the user and are not
/// returned to the caller.
#[derive(Debug, Error)]
pub enum BotError {
    #[error("Selected option not found")]
    NotFound,

    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    #[error(transparent)]
    Outbox(#[from] OutboxError),
}

/// An incoming chat interaction: a text message or a control callback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Update {
    pub user_id: i64,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub callback: Option<String>,
}

impl Update {
    pub fn text(user_id: i64, text: impl Into<String>) -> Self {
        Self {
            user_id,
            username: None,
            text: Some(text.into()),
            callback: None,
        }
    }

    pub fn callback(user_id: i64, data: impl Into<String>) -> Self {
        Self {
            user_id,
            username: None,
            text: None,
            callback: Some(data.into()),
        }
    }
}

/// Presentation and keep-alive knobs used by the bot.
#[derive(Debug, Clone)]
pub struct BotSettings {
    pub message_budget: usize,
    pub file_list_limit: usize,
    pub magnet_page_url: Option<String>,
    pub advertised_host: Option<String>,
    pub keep_alive: Duration,
    pub keep_alive_interval: Duration,
}

impl BotSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            message_budget: config.presentation.message_budget,
            file_list_limit: config.presentation.file_list_limit,
            magnet_page_url: config.presentation.magnet_page_url.clone(),
            advertised_host: config.torrserver.advertised_host.clone(),
            keep_alive: Duration::from_secs(config.torrserver.keep_alive_secs),
            keep_alive_interval: Duration::from_millis(config.torrserver.keep_alive_interval_ms),
        }
    }
}

impl Default for BotSettings {
    fn default() -> Self {
        Self {
            message_budget: 4096,
            file_list_limit: 25,
            magnet_page_url: None,
            advertised_host: None,
            keep_alive: Duration::from_secs(180),
            keep_alive_interval: Duration::from_secs(2),
        }
    }
}

/// Magnet link chosen for a selection.
struct SelectedMagnet {
    magnet: String,
    torrent_bytes: Option<Vec<u8>>,
    error: Option<String>,
}

pub struct Bot {
    orchestrator: SearchOrchestrator,
    cache: ResultCache,
    resolver: Arc<dyn LinkResolver>,
    poller: TorrentInfoPoller,
    outbox: Arc<dyn Outbox>,
    query_log: Option<QueryLog>,
    settings: BotSettings,
}

impl Bot {
    pub fn new(
        orchestrator: SearchOrchestrator,
        cache: ResultCache,
        resolver: Arc<dyn LinkResolver>,
        poller: TorrentInfoPoller,
        outbox: Arc<dyn Outbox>,
        settings: BotSettings,
    ) -> Self {
        Self {
            orchestrator,
            cache,
            resolver,
            poller,
            outbox,
            query_log: None,
            settings,
        }
    }

    pub fn with_query_log(mut self, query_log: Option<QueryLog>) -> Self {
        self.query_log = query_log;
        self
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    pub fn orchestrator(&self) -> &SearchOrchestrator {
        &self.orchestrator
    }

    /// Handle one update to completion of its synchronous part.
    ///
    /// Torrent info polling and keep-alive continue in the background.
    pub async fn handle_update(&self, update: Update) -> Result<(), BotError> {
        let command = match (&update.callback, &update.text) {
            (Some(data), _) => parse_callback(data),
            (None, Some(text)) => parse_text(text),
            (None, None) => Err(BotError::InvalidCommand("empty update".to_string())),
        };

        let command = match command {
            Ok(command) => command,
            Err(e) => {
                BOT_UPDATES.with_label_values(&["invalid"]).inc();
                debug!(user_id = update.user_id, error = %e, "Ignoring update");
                self.say(UserResponse::text(update.user_id, messages::INVALID_COMMAND))
                    .await?;
                return Err(e);
            }
        };

        let result = match command {
            Command::Start => {
                BOT_UPDATES.with_label_values(&["start"]).inc();
                self.say(UserResponse::text(update.user_id, messages::START))
                    .await
                    .map(|_| ())
            }
            Command::Search(text) => {
                BOT_UPDATES.with_label_values(&["search"]).inc();
                self.search(&update, &text).await
            }
            Command::Select {
                fingerprint,
                item_id,
            } => {
                BOT_UPDATES.with_label_values(&["select"]).inc();
                self.select(update.user_id, &fingerprint, &item_id).await
            }
            Command::File {
                fingerprint,
                item_id,
                file_id,
            } => {
                BOT_UPDATES.with_label_values(&["file"]).inc();
                self.file(update.user_id, &fingerprint, &item_id, &file_id)
                    .await
            }
            Command::Filter {
                filter,
                fingerprint,
            } => {
                BOT_UPDATES.with_label_values(&["filter"]).inc();
                self.filter(update.user_id, filter, &fingerprint).await
            }
        };

        match result {
            Err(BotError::NotFound) => {
                self.say(UserResponse::text(update.user_id, messages::OPTION_NOT_FOUND))
                    .await?;
                Ok(())
            }
            other => other,
        }
    }

    async fn say(&self, response: UserResponse) -> Result<MessageId, BotError> {
        Ok(self.outbox.send(response).await?)
    }

    async fn search(&self, update: &Update, text: &str) -> Result<(), BotError> {
        let user_id = update.user_id;
        info!(user_id, query = %text, "Received search");

        if let Some(log) = &self.query_log {
            log.append(user_id, update.username.as_deref(), text).await;
        }

        self.say(UserResponse::text(user_id, messages::searching_for(text)))
            .await?;

        let notifier = Arc::new(OutboxNotifier::new(Arc::clone(&self.outbox), user_id));
        let results = match self.orchestrator.search(text, notifier).await {
            Ok(results) => results,
            Err(e) => {
                warn!(user_id, query = %text, error = %e, "Search failed");
                self.say(UserResponse::text(user_id, messages::search_failed(&e.to_string())))
                    .await?;
                return Ok(());
            }
        };

        let fingerprint = self.cache.fingerprint(&normalize_query(text));
        self.cache.put(&fingerprint, results.clone()).await;

        if results.is_empty() {
            self.say(UserResponse::text(user_id, messages::NOTHING_FOUND))
                .await?;
            return Ok(());
        }

        self.say(render_results(
            user_id,
            messages::RESULTS_BY_POPULARITY,
            &fingerprint,
            &results,
            self.settings.message_budget,
        ))
        .await?;
        Ok(())
    }

    /// Pick the magnet for a cached result, memoizing it on the cache entry.
    async fn selected_magnet(&self, fingerprint: &str, item: &SearchResult) -> SelectedMagnet {
        if let Some(magnet) = item.computed_magnet.clone().filter(|m| !m.is_empty()) {
            debug!(fingerprint = %fingerprint, item = %item.id, "Using memoized magnet");
            return SelectedMagnet {
                magnet,
                torrent_bytes: None,
                error: None,
            };
        }

        let indexer_magnet = item.magnet.clone().unwrap_or_default();
        let selected = match item.torrent.as_deref() {
            Some(torrent_url) => match self.resolver.resolve(torrent_url).await {
                Ok(resolved) => SelectedMagnet {
                    magnet: if indexer_magnet.is_empty() {
                        resolved.magnet
                    } else {
                        indexer_magnet
                    },
                    torrent_bytes: resolved.from_file.then_some(resolved.torrent_bytes),
                    error: None,
                },
                Err(e) => SelectedMagnet {
                    magnet: indexer_magnet,
                    torrent_bytes: None,
                    error: Some(e.to_string()),
                },
            },
            None => SelectedMagnet {
                magnet: indexer_magnet,
                torrent_bytes: None,
                error: None,
            },
        };

        if !selected.magnet.is_empty() {
            let magnet = selected.magnet.clone();
            self.cache
                .update_item(fingerprint, &item.id, |r| r.computed_magnet = Some(magnet))
                .await;
        }
        selected
    }

    async fn find_item(&self, fingerprint: &str, item_id: &str) -> Result<SearchResult, BotError> {
        self.cache
            .get_item(fingerprint, item_id)
            .await
            .ok_or(BotError::NotFound)
    }

    async fn select(&self, user_id: i64, fingerprint: &str, item_id: &str) -> Result<(), BotError> {
        let item = self.find_item(fingerprint, item_id).await?;
        let selected = self.selected_magnet(fingerprint, &item).await;

        if let Some(error) = &selected.error {
            self.say(UserResponse::text(user_id, messages::magnet_error(error)))
                .await?;
        }

        let mut response = render_selection(
            user_id,
            &item,
            &selected.magnet,
            self.settings.magnet_page_url.as_deref(),
            selected.torrent_bytes,
        );
        if selected.magnet.is_empty() {
            response.message = format!("{}\n\n{}", response.message, messages::MISSING_MAGNET_LINK);
            self.say(response).await?;
            return Ok(());
        }

        let message_id = self.say(response.clone()).await?;

        let fingerprint = fingerprint.to_string();
        let item_id = item_id.to_string();
        let limit = self.settings.file_list_limit;
        let success_outbox = Arc::clone(&self.outbox);
        let failure_outbox = Arc::clone(&self.outbox);
        let failure_response = response.clone();

        self.poller.resolve_with(
            selected.magnet,
            Box::new(move |info: TorrentInfo| {
                async move {
                    let edited = render_file_list(&response, &fingerprint, &item_id, &info, limit);
                    if let Err(e) = success_outbox.edit(message_id, edited).await {
                        warn!(message_id, error = %e, "Failed to show torrent files");
                    }
                }
                .boxed()
            }),
            Some(Box::new(move |_: PollError| {
                async move {
                    let edited = render_info_not_found(&failure_response);
                    if let Err(e) = failure_outbox.edit(message_id, edited).await {
                        warn!(message_id, error = %e, "Failed to show torrent info alert");
                    }
                }
                .boxed()
            })),
        );
        Ok(())
    }

    async fn file(
        &self,
        user_id: i64,
        fingerprint: &str,
        item_id: &str,
        file_id: &str,
    ) -> Result<(), BotError> {
        let item = self.find_item(fingerprint, item_id).await?;
        let selected = self.selected_magnet(fingerprint, &item).await;

        if selected.magnet.is_empty() {
            self.say(UserResponse::text(user_id, messages::TORRENT_INFO_NOT_FOUND))
                .await?;
            return Ok(());
        }

        let backend = Arc::clone(self.poller.backend());
        let success_outbox = Arc::clone(&self.outbox);
        let failure_outbox = Arc::clone(&self.outbox);
        let settings = self.settings.clone();
        let file_id = file_id.to_string();

        self.poller.resolve_with(
            selected.magnet,
            Box::new(move |info: TorrentInfo| {
                async move {
                    let link = advertised_link(
                        &backend.play_link(&info.hash, &file_id),
                        settings.advertised_host.as_deref(),
                    );
                    let response = render_download_link(user_id, &info, &file_id, &link);

                    match success_outbox.send(response.clone()).await {
                        Ok(_) => {}
                        Err(OutboxError::ControlsRejected(reason)) => {
                            warn!(user_id, reason = %reason, "Download control rejected, sending plain link");
                            if let Err(e) = success_outbox.send(response.without_controls()).await {
                                warn!(user_id, error = %e, "Failed to send download link");
                            }
                        }
                        Err(e) => warn!(user_id, error = %e, "Failed to send download link"),
                    }

                    spawn_keep_alive(
                        backend,
                        info.hash,
                        settings.keep_alive,
                        settings.keep_alive_interval,
                    );
                }
                .boxed()
            }),
            Some(Box::new(move |_: PollError| {
                async move {
                    let response = UserResponse::text(user_id, messages::TORRENT_INFO_NOT_FOUND);
                    if let Err(e) = failure_outbox.send(response).await {
                        warn!(user_id, error = %e, "Failed to send torrent info alert");
                    }
                }
                .boxed()
            })),
        );
        Ok(())
    }

    async fn filter(
        &self,
        user_id: i64,
        filter: SizeFilter,
        fingerprint: &str,
    ) -> Result<(), BotError> {
        let results = self.cache.get_by_fingerprint(fingerprint).await;
        if results.is_empty() {
            self.say(UserResponse::text(user_id, messages::SEARCH_EXPIRED))
                .await?;
            return Ok(());
        }

        let filtered = apply_filter(&results, filter);
        self.say(render_results(
            user_id,
            messages::filter_title(filter),
            fingerprint,
            &filtered,
            self.settings.message_budget,
        ))
        .await?;
        Ok(())
    }
}
