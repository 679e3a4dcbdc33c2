use async_trait::async_trait;

use crate::channel::Channel;
use crate::error::StoreError;
use crate::model::{Message, NewMessage, Participant, TicketId};

/// The backing store the conversation core talks to.
///
/// Injected as `Arc<dyn TicketStore>` so tests can swap in a deterministic
/// double.
#[async_trait]
pub trait TicketStore: Send + Sync {
    /// All messages of a ticket, ascending by creation time.
    async fn history(&self, ticket_id: TicketId) -> Result<Vec<Message>, StoreError>;

    /// Inserts one row; the store assigns id and timestamp.
    async fn insert(&self, message: &NewMessage) -> Result<Message, StoreError>;

    /// Opens the insert feed of one ticket.
    ///
    /// Frames carry [`MESSAGE_CREATED_EVENT`](crate::model::MESSAGE_CREATED_EVENT)
    /// with the new row as payload.
    async fn subscribe_inserts(&self, ticket_id: TicketId, capacity: usize) -> Result<Channel, StoreError>;

    /// Joins a ticket's presence channel and tracks `me` on it until the
    /// returned channel is closed.
    ///
    /// Frames carry [`PRESENCE_SYNC_EVENT`](crate::model::PRESENCE_SYNC_EVENT)
    /// with the full membership as payload.
    async fn join_presence(
        &self,
        ticket_id: TicketId,
        me: &Participant,
        capacity: usize,
    ) -> Result<Channel, StoreError>;
}

/// Ticket ids are positive.
pub fn validate_ticket_id(ticket_id: TicketId) -> Result<TicketId, StoreError> {
    if ticket_id > 0 {
        Ok(ticket_id)
    } else {
        Err(StoreError::InvalidTicket(ticket_id))
    }
}
