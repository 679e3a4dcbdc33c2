//! Ordered, de-duplicated message list of one ticket.

use std::collections::HashSet;

use crate::model::{Message, TicketId};

/// What [`Reconciler::apply`] did with a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Appended,
    /// Already held; the list is unchanged.
    Duplicate,
    /// Belongs to another ticket; ignored.
    ForeignTicket,
}

/// Holds messages sorted by `(created_at, id)` with no repeated id.
#[derive(Debug, Clone)]
pub struct Reconciler {
    ticket_id: TicketId,
    messages: Vec<Message>,
    seen: HashSet<i64>,
}

impl Reconciler {
    pub fn new(ticket_id: TicketId) -> Self {
        Self {
            ticket_id,
            messages: Vec::new(),
            seen: HashSet::new(),
        }
    }

    pub fn ticket_id(&self) -> TicketId {
        self.ticket_id
    }

    /// Replaces the held list with the historical load.
    pub fn seed(&mut self, history: Vec<Message>) {
        self.messages.clear();
        self.seen.clear();
        self.merge(history);
    }

    /// Folds a (re-)run of the historical load into the list. Returns how
    /// many messages were new.
    pub fn merge(&mut self, history: Vec<Message>) -> usize {
        history
            .into_iter()
            .filter(|m| self.apply(m.clone()) == Applied::Appended)
            .count()
    }

    pub fn apply(&mut self, message: Message) -> Applied {
        if message.ticket_id != self.ticket_id {
            return Applied::ForeignTicket;
        }
        if !self.seen.insert(message.id) {
            return Applied::Duplicate;
        }

        let key = message.display_key();
        let at = self.messages.partition_point(|m| m.display_key() < key);
        self.messages.insert(at, message);
        Applied::Appended
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn contains(&self, id: i64) -> bool {
        self.seen.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
