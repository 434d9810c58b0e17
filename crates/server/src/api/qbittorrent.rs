//! Hand a cached search result to qBittorrent.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use tracing::{info, warn};

use seekbot_core::torrent_client::{AddTorrentRequest, TorrentSource};

use super::handlers::ErrorResponse;
use crate::metrics::TORRENT_CLIENT_ADDS;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct AddTorrentResponse {
    pub client: String,
    pub name: String,
}

/// POST /api/v1/qbittorrent/{fingerprint}/{item}
///
/// Prefers the magnet link, falling back to the `.torrent` URL.
pub async fn add_result(
    State(state): State<Arc<AppState>>,
    Path((fingerprint, item_id)): Path<(String, String)>,
) -> impl IntoResponse {
    let Some(client) = state.torrent_client() else {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            ErrorResponse::new("qBittorrent is not configured"),
        )
            .into_response();
    };

    let Some(item) = state.bot().cache().get_item(&fingerprint, &item_id).await else {
        return (
            StatusCode::NOT_FOUND,
            ErrorResponse::new("Search result not found"),
        )
            .into_response();
    };

    let link = [&item.computed_magnet, &item.magnet, &item.torrent]
        .into_iter()
        .flatten()
        .find(|link| !link.is_empty())
        .cloned();

    let Some(link) = link else {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            ErrorResponse::new("Search result has no magnet or torrent link"),
        )
            .into_response();
    };

    let request = AddTorrentRequest {
        source: TorrentSource::from_link(link),
        name: item.title.clone(),
    };

    match client.add_torrent(request).await {
        Ok(()) => {
            TORRENT_CLIENT_ADDS.with_label_values(&["added"]).inc();
            info!(fingerprint = %fingerprint, item = %item_id, "Result sent to torrent client");
            (
                StatusCode::OK,
                Json(AddTorrentResponse {
                    client: client.name().to_string(),
                    name: item.title,
                }),
            )
                .into_response()
        }
        Err(e) => {
            TORRENT_CLIENT_ADDS.with_label_values(&["failed"]).inc();
            warn!(fingerprint = %fingerprint, item = %item_id, error = %e, "Torrent client rejected result");
            (StatusCode::BAD_GATEWAY, ErrorResponse::new(e.to_string())).into_response()
        }
    }
}
