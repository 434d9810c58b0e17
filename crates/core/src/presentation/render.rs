//! Transport-neutral responses and the text layouts built into them.

use serde::{Deserialize, Serialize};

use crate::messages;
use crate::poller::TorrentInfo;
use crate::searcher::SearchResult;

use super::escape::escape_html;
use super::filters::suggest_filters;
use super::size::is_video;

/// What a control does when the user activates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ControlAction {
    /// Opaque payload handed back as a callback update.
    Callback(String),
    /// Link opened directly by the client.
    Url(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseControl {
    pub title: String,
    pub action: ControlAction,
}

impl ResponseControl {
    pub fn callback(title: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            action: ControlAction::Callback(data.into()),
        }
    }

    pub fn url(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            action: ControlAction::Url(url.into()),
        }
    }
}

/// A binary attachment, e.g. the raw `.torrent` file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// A message for the chat transport: HTML body, controls and attachments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserResponse {
    pub user_id: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub controls: Vec<ResponseControl>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<ResponseFile>,
}

impl UserResponse {
    pub fn text(user_id: i64, message: impl Into<String>) -> Self {
        Self {
            user_id,
            message: message.into(),
            controls: Vec::new(),
            files: Vec::new(),
        }
    }

    pub fn with_controls(mut self, controls: Vec<ResponseControl>) -> Self {
        self.controls = controls;
        self
    }

    pub fn with_files(mut self, files: Vec<ResponseFile>) -> Self {
        self.files = files;
        self
    }

    pub fn without_controls(&self) -> Self {
        Self {
            controls: Vec::new(),
            ..self.clone()
        }
    }
}

fn seeds_text(seeds: Option<u32>) -> String {
    seeds.map(|s| s.to_string()).unwrap_or_else(|| "?".to_string())
}

fn result_row(fingerprint: &str, result: &SearchResult) -> String {
    let mut indicator = String::new();
    if result.magnet.is_some() {
        indicator.push('Ⓜ');
    }
    if result.torrent.is_some() {
        indicator.push('Ⓣ');
    }

    format!(
        "{}\n/select_{}_{}\n📄️{} 🌱{} 🏁<i>{}</i> {}\n\n",
        escape_html(&result.title),
        fingerprint,
        result.id,
        result.size,
        seeds_text(result.seeds),
        escape_html(result.tracker.as_deref().unwrap_or("")),
        indicator
    )
}

/// Render a result list, stopping before a row would push the text past `budget` chars.
///
/// Filter controls are suggested from the full `results` slice.
pub fn render_results(
    user_id: i64,
    title: &str,
    fingerprint: &str,
    results: &[SearchResult],
    budget: usize,
) -> UserResponse {
    let mut message = format!("{}\n\n", title);
    let mut length = message.chars().count();

    for result in results {
        let row = result_row(fingerprint, result);
        let row_length = row.chars().count();
        if length + row_length > budget {
            break;
        }
        message.push_str(&row);
        length += row_length;
    }

    let controls = suggest_filters(results, fingerprint)
        .into_iter()
        .map(|a| ResponseControl::callback(a.label, a.command))
        .collect();

    UserResponse::text(user_id, message).with_controls(controls)
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// URL for the magnet control.
///
/// With a page URL, the magnet is wrapped in an HTML anchor and appended
/// hex-encoded, since chat buttons cannot carry `magnet:` links directly.
pub fn magnet_control_url(magnet: &str, magnet_page_url: Option<&str>) -> String {
    match magnet_page_url {
        Some(page) => {
            let anchor = format!("<a href=\"{}\">{}</a>", magnet, messages::MAGNET_LINK_ANCHOR);
            format!("{}{}", page, to_hex(anchor.as_bytes()))
        }
        None => magnet.to_string(),
    }
}

/// Selection message for one result, with the magnet control and `.torrent` attachment.
pub fn render_selection(
    user_id: i64,
    result: &SearchResult,
    magnet: &str,
    magnet_page_url: Option<&str>,
    torrent_bytes: Option<Vec<u8>>,
) -> UserResponse {
    let message = format!(
        "<b>{}</b>\n\n📄️{} 🌱{} 🏁<i>{}</i>",
        escape_html(&result.title),
        result.size,
        seeds_text(result.seeds),
        escape_html(result.tracker.as_deref().unwrap_or(messages::UNKNOWN_TRACKER))
    );

    let mut controls = Vec::new();
    if !magnet.is_empty() {
        controls.push(ResponseControl::url(
            messages::MAGNET_LINK_BUTTON,
            magnet_control_url(magnet, magnet_page_url),
        ));
    }

    let files = torrent_bytes
        .filter(|b| !b.is_empty())
        .map(|bytes| ResponseFile {
            name: format!("{}.torrent", result.title),
            bytes,
        })
        .into_iter()
        .collect();

    UserResponse::text(user_id, message)
        .with_controls(controls)
        .with_files(files)
}

fn basename(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Extend a selection message with `/file` commands for the first `limit` files.
pub fn render_file_list(
    base: &UserResponse,
    fingerprint: &str,
    item_id: &str,
    info: &TorrentInfo,
    limit: usize,
) -> UserResponse {
    let mut message = format!("{}\n\n{}\n", base.message, messages::FILES_IN_TORRENT);

    for (index, file) in info.files.iter().enumerate() {
        if index == limit {
            message.push_str("...");
            break;
        }
        let title = basename(&file.title);
        message.push_str(&format!(
            "/file_{}_{}_{} {} {} - {}\n",
            fingerprint,
            item_id,
            file.id,
            super::size::file_icon(title),
            escape_html(title),
            file.size
        ));
    }

    UserResponse {
        message,
        files: Vec::new(),
        ..base.clone()
    }
}

/// Extend a selection message with the "torrent info not found" alert.
pub fn render_info_not_found(base: &UserResponse) -> UserResponse {
    UserResponse {
        message: format!("{}\n\n{}", base.message, messages::TORRENT_INFO_NOT_FOUND),
        files: Vec::new(),
        ..base.clone()
    }
}

/// Download message for one file, carrying the playable link and a Download control.
pub fn render_download_link(
    user_id: i64,
    info: &TorrentInfo,
    file_id: &str,
    link: &str,
) -> UserResponse {
    let file = info.file(file_id);
    let file_title = file
        .map(|f| format!("<code>{}</code> - {}", escape_html(basename(&f.title)), f.size))
        .unwrap_or_else(|| messages::UNKNOWN_FILE.to_string());

    let mut message = format!("🥂{}\n<pre>{}</pre>", file_title, escape_html(link));
    if file.is_some_and(|f| is_video(basename(&f.title))) {
        message.push_str(&format!("\n<i>* {}</i>", messages::PASTE_LINK_TO_PLAYER));
    }
    message.push_str(&format!("\n<i>* {}</i>", messages::LINK_EXPIRES));
    message.push_str(&format!("\n\n<i>* {}</i>", messages::RENAME_FILE));

    UserResponse::text(user_id, message)
        .with_controls(vec![ResponseControl::url(messages::DOWNLOAD_BUTTON, link)])
}
