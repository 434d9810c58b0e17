//! WebSocket delivery of bot responses to the chat adapter.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use seekbot_core::bot::{MessageId, Outbox, OutboxError};
use seekbot_core::UserResponse;

use crate::metrics::{
    OUTBOX_DELIVERIES, WS_CONNECTIONS_ACTIVE, WS_CONNECTIONS_TOTAL, WS_LAG_EVENTS, WS_MESSAGES_SENT,
};
use crate::state::AppState;

/// WebSocket message sent to the chat adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsMessage {
    /// Deliver a new message to a user.
    Send {
        message_id: MessageId,
        response: UserResponse,
    },
    /// Replace the content of a message delivered earlier.
    Edit {
        message_id: MessageId,
        response: UserResponse,
    },
    /// Server heartbeat (sent periodically to keep connection alive).
    Heartbeat { timestamp: i64 },
}

impl WsMessage {
    fn kind(&self) -> &'static str {
        match self {
            WsMessage::Send { .. } => "send",
            WsMessage::Edit { .. } => "edit",
            WsMessage::Heartbeat { .. } => "heartbeat",
        }
    }
}

/// Broadcaster for WebSocket messages using tokio broadcast channel.
#[derive(Debug, Clone)]
pub struct WsBroadcaster {
    sender: broadcast::Sender<WsMessage>,
}

impl WsBroadcaster {
    /// Create a new broadcaster with the given channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Broadcast a message to all connected clients, returning how many received it.
    pub fn broadcast(&self, msg: WsMessage) -> usize {
        self.sender.send(msg).unwrap_or(0)
    }

    /// Subscribe to receive messages.
    pub fn subscribe(&self) -> broadcast::Receiver<WsMessage> {
        self.sender.subscribe()
    }

    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for WsBroadcaster {
    fn default() -> Self {
        Self::new(256)
    }
}

/// [`Outbox`] publishing bot responses on the broadcast channel.
///
/// Message ids are assigned here. A response nobody is subscribed to counts
/// as a failed delivery. Control validation happens in the adapter after
/// publishing, so this outbox never reports `ControlsRejected`.
pub struct WsOutbox {
    broadcaster: WsBroadcaster,
    next_id: AtomicU64,
}

impl WsOutbox {
    pub fn new(broadcaster: WsBroadcaster) -> Self {
        Self {
            broadcaster,
            next_id: AtomicU64::new(0),
        }
    }

    fn publish(&self, msg: WsMessage) -> Result<(), OutboxError> {
        let operation = msg.kind();
        if self.broadcaster.broadcast(msg) == 0 {
            OUTBOX_DELIVERIES
                .with_label_values(&[operation, "no_adapter"])
                .inc();
            return Err(OutboxError::Delivery(
                "no chat adapter connected".to_string(),
            ));
        }
        OUTBOX_DELIVERIES
            .with_label_values(&[operation, "delivered"])
            .inc();
        Ok(())
    }
}

#[async_trait]
impl Outbox for WsOutbox {
    async fn send(&self, response: UserResponse) -> Result<MessageId, OutboxError> {
        let message_id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.publish(WsMessage::Send {
            message_id,
            response,
        })?;
        Ok(message_id)
    }

    async fn edit(&self, message_id: MessageId, response: UserResponse) -> Result<(), OutboxError> {
        self.publish(WsMessage::Edit {
            message_id,
            response,
        })
    }
}

/// Broadcast a heartbeat every `interval` until the task is aborted.
pub fn spawn_heartbeat(broadcaster: WsBroadcaster, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            broadcaster.broadcast(WsMessage::Heartbeat {
                timestamp: chrono::Utc::now().timestamp(),
            });
        }
    })
}

/// WebSocket upgrade handler.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

/// Handle a single WebSocket connection.
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();

    let mut rx = state.ws_broadcaster().subscribe();

    WS_CONNECTIONS_TOTAL.inc();
    WS_CONNECTIONS_ACTIVE.inc();

    info!("WebSocket client connected");

    let send_task = tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(msg) => {
                    WS_MESSAGES_SENT.with_label_values(&[msg.kind()]).inc();

                    match serde_json::to_string(&msg) {
                        Ok(json) => {
                            if sender.send(Message::Text(json.into())).await.is_err() {
                                debug!("WebSocket send failed, client disconnected");
                                break;
                            }
                        }
                        Err(e) => {
                            error!("Failed to serialize WsMessage: {}", e);
                        }
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!("WebSocket client lagged, skipped {} messages", n);
                    WS_LAG_EVENTS.inc();
                }
                Err(broadcast::error::RecvError::Closed) => {
                    debug!("Broadcast channel closed");
                    break;
                }
            }
        }
    });

    while let Some(result) = receiver.next().await {
        match result {
            Ok(Message::Close(_)) => {
                debug!("WebSocket client requested close");
                break;
            }
            Ok(Message::Text(text)) => {
                // Updates come in over HTTP
                debug!("Received text message: {}", text);
            }
            Ok(_) => {}
            Err(e) => {
                warn!("WebSocket receive error: {}", e);
                break;
            }
        }
    }

    send_task.abort();
    WS_CONNECTIONS_ACTIVE.dec();
    info!("WebSocket client disconnected");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_outbox_assigns_increasing_ids() {
        let broadcaster = WsBroadcaster::default();
        let mut rx = broadcaster.subscribe();
        let outbox = WsOutbox::new(broadcaster);

        let first = outbox.send(UserResponse::text(1, "hello")).await.unwrap();
        let second = outbox.send(UserResponse::text(1, "again")).await.unwrap();
        outbox
            .edit(first, UserResponse::text(1, "edited"))
            .await
            .unwrap();

        assert_eq!((first, second), (1, 2));
        assert_eq!(
            rx.recv().await.unwrap(),
            WsMessage::Send {
                message_id: 1,
                response: UserResponse::text(1, "hello"),
            }
        );
        rx.recv().await.unwrap();
        assert_eq!(
            rx.recv().await.unwrap(),
            WsMessage::Edit {
                message_id: 1,
                response: UserResponse::text(1, "edited"),
            }
        );
    }

    #[tokio::test]
    async fn test_outbox_without_subscribers_fails() {
        let outbox = WsOutbox::new(WsBroadcaster::default());
        let response = UserResponse::text(1, "hello").with_controls(vec![
            seekbot_core::presentation::ResponseControl::url("⬇️", "http://x/play/h/1"),
        ]);
        let err = outbox.send(response).await.unwrap_err();
        assert!(matches!(err, OutboxError::Delivery(_)));
    }

    #[test]
    fn test_message_wire_format() {
        let msg = WsMessage::Send {
            message_id: 3,
            response: UserResponse::text(9, "hi"),
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "send");
        assert_eq!(json["message_id"], 3);
        assert_eq!(json["response"]["user_id"], 9);
        assert_eq!(json["response"]["message"], "hi");
        assert!(json["response"].get("controls").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_heartbeat_ticks() {
        let broadcaster = WsBroadcaster::default();
        let mut rx = broadcaster.subscribe();
        let handle = spawn_heartbeat(broadcaster, Duration::from_secs(30));

        let msg = rx.recv().await.unwrap();
        assert!(matches!(msg, WsMessage::Heartbeat { .. }));
        handle.abort();
    }
}
