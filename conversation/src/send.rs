//! Message send path.
//!
//! Sending never touches the local message list; a sent row shows up when
//! the change feed echoes it back.

use crate::error::SendError;
use crate::model::{Message, NewMessage, Participant, TicketId};
use crate::store::TicketStore;

/// Inserts one message. Empty or whitespace-only bodies are refused without
/// reaching the store.
pub async fn submit(
    store: &dyn TicketStore,
    ticket_id: TicketId,
    sender: &Participant,
    body: &str,
) -> Result<Message, SendError> {
    if body.trim().is_empty() {
        return Err(SendError::EmptyBody);
    }

    let new = NewMessage {
        ticket_id,
        sender_id: sender.id,
        sender_role: sender.role,
        body: body.to_owned(),
    };

    match store.insert(&new).await {
        Ok(message) => {
            tracing::debug!(ticket_id, message_id = message.id, "message sent");
            Ok(message)
        }
        Err(e) => {
            tracing::warn!(ticket_id, sender_id = sender.id, "send failed: {e}");
            Err(SendError::Store(e))
        }
    }
}

/// Draft text of a conversation's input box.
///
/// The draft is cleared only after the store accepted it, so a failed send
/// can be retried as-is.
#[derive(Debug, Clone, Default)]
pub struct Composer {
    draft: String,
}

impl Composer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    pub fn can_send(&self) -> bool {
        !self.draft.trim().is_empty()
    }

    pub async fn send(
        &mut self,
        store: &dyn TicketStore,
        ticket_id: TicketId,
        sender: &Participant,
    ) -> Result<Message, SendError> {
        let message = submit(store, ticket_id, sender, &self.draft).await?;
        self.draft.clear();
        Ok(message)
    }
}
