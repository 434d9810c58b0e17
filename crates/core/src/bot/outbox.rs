use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;

use crate::messages;
use crate::orchestrator::{SearchNotifier, SlowSearchNotice};
use crate::presentation::UserResponse;

/// Transport-assigned identifier of a sent message.
pub type MessageId = u64;

#[derive(Debug, Clone, Error)]
pub enum OutboxError {
    #[error("Message delivery failed: {0}")]
    Delivery(String),

    /// The transport refused the message's controls but would take its text.
    #[error("Message controls rejected: {0}")]
    ControlsRejected(String),
}

/// Sink for bot responses, implemented by the chat transport.
#[async_trait]
pub trait Outbox: Send + Sync {
    /// Send a new message, returning its id for later edits.
    ///
    /// Transports that validate controls synchronously report a refusal as
    /// [`OutboxError::ControlsRejected`]; the bot then resends without them.
    async fn send(&self, response: UserResponse) -> Result<MessageId, OutboxError>;

    /// Replace the content of a previously sent message.
    async fn edit(&self, message_id: MessageId, response: UserResponse) -> Result<(), OutboxError>;
}

/// Delivers slow-search notices to one user through an [`Outbox`].
pub struct OutboxNotifier {
    outbox: Arc<dyn Outbox>,
    user_id: i64,
}

impl OutboxNotifier {
    pub fn new(outbox: Arc<dyn Outbox>, user_id: i64) -> Self {
        Self { outbox, user_id }
    }
}

#[async_trait]
impl SearchNotifier for OutboxNotifier {
    async fn slow_search(&self, notice: SlowSearchNotice) {
        let response = UserResponse::text(self.user_id, messages::slow_search(notice));
        if let Err(e) = self.outbox.send(response).await {
            warn!(user_id = self.user_id, error = %e, "Failed to send slow-search notice");
        }
    }
}
