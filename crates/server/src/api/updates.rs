//! Chat update intake.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use tracing::warn;

use seekbot_core::{BotError, Update};

use super::handlers::ErrorResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct UpdateAccepted {
    pub status: String,
}

/// POST /api/v1/updates
///
/// Handle one chat update. Responses reach the user through the WebSocket
/// stream; the HTTP reply only reports whether handling succeeded.
pub async fn post_update(
    State(state): State<Arc<AppState>>,
    Json(update): Json<Update>,
) -> impl IntoResponse {
    let user_id = update.user_id;
    match state.bot().handle_update(update).await {
        Ok(()) => (
            StatusCode::OK,
            Json(UpdateAccepted {
                status: "ok".to_string(),
            }),
        )
            .into_response(),
        Err(e @ BotError::InvalidCommand(_)) => {
            (StatusCode::BAD_REQUEST, ErrorResponse::new(e.to_string())).into_response()
        }
        Err(e @ BotError::NotFound) => {
            (StatusCode::NOT_FOUND, ErrorResponse::new(e.to_string())).into_response()
        }
        Err(e @ BotError::Outbox(_)) => {
            warn!(user_id, error = %e, "Failed to deliver bot response");
            (StatusCode::BAD_GATEWAY, ErrorResponse::new(e.to_string())).into_response()
        }
    }
}
