//! Recording sinks for bot output and search notices.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::bot::{MessageId, Outbox, OutboxError};
use crate::orchestrator::{SearchNotifier, SlowSearchNotice};
use crate::presentation::{ControlAction, UserResponse};

/// Something the bot did through the outbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboxEvent {
    Sent { id: MessageId, response: UserResponse },
    Edited { id: MessageId, response: UserResponse },
}

/// Outbox capturing every sent and edited response.
#[derive(Debug, Default)]
pub struct RecordingOutbox {
    events: Mutex<Vec<OutboxEvent>>,
    next_id: AtomicU64,
    url_failure: Mutex<Option<OutboxError>>,
    rejected: AtomicU64,
}

impl RecordingOutbox {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuse sends carrying URL controls, as chat transports do for bad links.
    pub fn rejecting_url_controls(self) -> Self {
        self.failing_url_sends_with(OutboxError::ControlsRejected("button URL rejected".to_string()))
    }

    /// Fail every send carrying URL controls with `error`.
    pub fn failing_url_sends_with(self, error: OutboxError) -> Self {
        *self.url_failure.lock().unwrap() = Some(error);
        self
    }

    /// Number of sends refused so far.
    pub fn rejected(&self) -> u64 {
        self.rejected.load(Ordering::SeqCst)
    }

    pub fn events(&self) -> Vec<OutboxEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn sent(&self) -> Vec<UserResponse> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                OutboxEvent::Sent { response, .. } => Some(response),
                OutboxEvent::Edited { .. } => None,
            })
            .collect()
    }

    /// Text of every sent message, in order.
    pub fn sent_messages(&self) -> Vec<String> {
        self.sent().into_iter().map(|r| r.message).collect()
    }

    pub fn edits(&self) -> Vec<(MessageId, UserResponse)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                OutboxEvent::Edited { id, response } => Some((id, response)),
                OutboxEvent::Sent { .. } => None,
            })
            .collect()
    }
}

#[async_trait]
impl Outbox for RecordingOutbox {
    async fn send(&self, response: UserResponse) -> Result<MessageId, OutboxError> {
        let has_url = response
            .controls
            .iter()
            .any(|c| matches!(c.action, ControlAction::Url(_)));
        if has_url {
            if let Some(error) = self.url_failure.lock().unwrap().clone() {
                self.rejected.fetch_add(1, Ordering::SeqCst);
                return Err(error);
            }
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.events
            .lock()
            .unwrap()
            .push(OutboxEvent::Sent { id, response });
        Ok(id)
    }

    async fn edit(&self, message_id: MessageId, response: UserResponse) -> Result<(), OutboxError> {
        self.events.lock().unwrap().push(OutboxEvent::Edited {
            id: message_id,
            response,
        });
        Ok(())
    }
}

/// Search notifier capturing every notice.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<SlowSearchNotice>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<SlowSearchNotice> {
        self.notices.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchNotifier for RecordingNotifier {
    async fn slow_search(&self, notice: SlowSearchNotice) {
        self.notices.lock().unwrap().push(notice);
    }
}
