//! Change-feed subscription client.

use crate::channel::Channel;
use crate::error::{DecodeError, StoreError};
use crate::model::{Frame, MESSAGE_CREATED_EVENT, Message, TicketId};
use crate::store::{TicketStore, validate_ticket_id};

/// Live insert stream of one ticket's messages.
///
/// Delivery is at-least-once in transport order. A dropped transport is not
/// reopened and rows committed while it was down are not replayed here.
pub struct ChangeFeed {
    ticket_id: TicketId,
    channel: Channel,
}

impl ChangeFeed {
    pub async fn open(store: &dyn TicketStore, ticket_id: TicketId, capacity: usize) -> Result<Self, StoreError> {
        let ticket_id = validate_ticket_id(ticket_id)?;
        let channel = store.subscribe_inserts(ticket_id, capacity).await?;
        tracing::debug!(ticket_id, "change feed opened");
        Ok(Self { ticket_id, channel })
    }

    pub fn ticket_id(&self) -> TicketId {
        self.ticket_id
    }

    /// Next valid inserted row. Invalid frames are logged and skipped.
    ///
    /// Returns `None` once the transport is gone.
    pub async fn next(&mut self) -> Option<Message> {
        loop {
            let frame = self.channel.recv().await?;
            match decode_insert(self.ticket_id, &frame) {
                Ok(message) => return Some(message),
                Err(e) => tracing::warn!(ticket_id = self.ticket_id, "dropping change-feed frame: {e}"),
            }
        }
    }

    pub async fn close(self) {
        self.channel.close().await;
        tracing::debug!(ticket_id = self.ticket_id, "change feed closed");
    }
}

/// Validates one change-feed frame against the strict message schema.
pub fn decode_insert(ticket_id: TicketId, frame: &Frame) -> Result<Message, DecodeError> {
    if frame.event != MESSAGE_CREATED_EVENT {
        return Err(DecodeError::UnexpectedEvent(frame.event.clone()));
    }
    let message: Message = serde_json::from_value(frame.payload.clone())?;
    if message.ticket_id != ticket_id {
        return Err(DecodeError::ForeignTicket {
            expected: ticket_id,
            got: message.ticket_id,
        });
    }
    Ok(message)
}
