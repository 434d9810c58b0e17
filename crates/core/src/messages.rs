//! User-facing message text.

use crate::orchestrator::SlowSearchNotice;
use crate::presentation::{escape_html, SizeFilter};

pub const START: &str = "👋 Send me what you are looking for and I will search the torrent trackers.\n\nPick a result with its /select command, then a file with its /file command to get a streaming link.";
pub const NOTHING_FOUND: &str = "😔 Nothing found, try another query";
pub const RESULTS_BY_POPULARITY: &str = "🔥 Results sorted by popularity";
pub const OPTION_NOT_FOUND: &str = "🤷 This option is not available anymore, please search again";
pub const SEARCH_EXPIRED: &str = "⌛ This search has expired, please search again";
pub const MISSING_MAGNET_LINK: &str = "Magnet link is not available";
pub const MAGNET_LINK_BUTTON: &str = "🧲 Magnet link";
pub const MAGNET_LINK_ANCHOR: &str = "&#129522; Your magnet link";
pub const FILES_IN_TORRENT: &str = "📂 Files in torrent:";
pub const TORRENT_INFO_NOT_FOUND: &str = "😕 Could not get the torrent info, the torrent may have no seeds";
pub const DOWNLOAD_BUTTON: &str = "⬇️ Download";
pub const PASTE_LINK_TO_PLAYER: &str = "Paste the link into a video player (e.g. VLC) to watch without downloading";
pub const LINK_EXPIRES: &str = "The link works while the torrent is active and may expire in a few minutes";
pub const RENAME_FILE: &str = "If the downloaded file has no extension, rename it to the original name";
pub const UNKNOWN_TRACKER: &str = "Unknown tracker";
pub const UNKNOWN_FILE: &str = "Unknown file";
pub const INVALID_COMMAND: &str = "🤔 Unknown command";

pub fn searching_for(query: &str) -> String {
    format!("🔎 Searching for <b>{}</b>...", escape_html(query))
}

pub fn slow_search(notice: SlowSearchNotice) -> String {
    match notice {
        SlowSearchNotice::TakesLonger => {
            "⏳ The search takes longer than usual, please wait...".to_string()
        }
        SlowSearchNotice::Estimated { average_secs } => format!(
            "⏳ The search takes a while, it usually finishes in about {} seconds",
            average_secs
        ),
    }
}

pub fn search_failed(error: &str) -> String {
    format!("❗ Search failed: {}", escape_html(error))
}

pub fn magnet_error(error: &str) -> String {
    format!("❗ {}", escape_html(error))
}

pub fn filter_button(filter: SizeFilter) -> &'static str {
    match filter {
        SizeFilter::LessThan2Gb => "< 2 GB",
        SizeFilter::MoreThan4Gb => "> 4 GB",
        SizeFilter::MoreThan10Gb => "> 10 GB",
    }
}

pub fn filter_title(filter: SizeFilter) -> &'static str {
    match filter {
        SizeFilter::LessThan2Gb => "📉 Results smaller than 2 GB",
        SizeFilter::MoreThan4Gb => "📈 Results larger than 4 GB",
        SizeFilter::MoreThan10Gb => "📈 Results larger than 10 GB",
    }
}
