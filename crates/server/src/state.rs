use std::sync::Arc;

use seekbot_core::{Bot, Config, SanitizedConfig, TorrentClient};

use crate::api::WsBroadcaster;

/// Shared application state
pub struct AppState {
    config: Config,
    bot: Arc<Bot>,
    ws_broadcaster: WsBroadcaster,
    torrent_client: Option<Arc<dyn TorrentClient>>,
}

impl AppState {
    pub fn new(
        config: Config,
        bot: Arc<Bot>,
        ws_broadcaster: WsBroadcaster,
        torrent_client: Option<Arc<dyn TorrentClient>>,
    ) -> Self {
        Self {
            config,
            bot,
            ws_broadcaster,
            torrent_client,
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn bot(&self) -> &Bot {
        self.bot.as_ref()
    }

    pub fn ws_broadcaster(&self) -> &WsBroadcaster {
        &self.ws_broadcaster
    }

    pub fn torrent_client(&self) -> Option<&Arc<dyn TorrentClient>> {
        self.torrent_client.as_ref()
    }
}
