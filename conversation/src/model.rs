//! Typed shapes exchanged with the backing store.
//!
//! Everything that crosses the transport is decoded into these types at the
//! subscription boundary; nothing loosely typed reaches the reconciler.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub type TicketId = i64;
pub type UserId = i64;

/// Event carried by the change feed for every inserted row.
pub const MESSAGE_CREATED_EVENT: &str = "ticket.message_created";
/// Event carried by the presence channel with a full membership snapshot.
pub const PRESENCE_SYNC_EVENT: &str = "presence.sync";
/// Sent once by the server when a change-feed socket is subscribed.
pub const SUBSCRIBED_EVENT: &str = "ticket.subscribed";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SenderRole {
    Requester,
    Responder,
}

impl SenderRole {
    pub fn as_str(self) -> &'static str {
        match self {
            SenderRole::Requester => "requester",
            SenderRole::Responder => "responder",
        }
    }
}

impl fmt::Display for SenderRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One committed row of a ticket's conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Assigned by the store; increases with every insert.
    pub id: i64,
    pub ticket_id: TicketId,
    pub sender_id: UserId,
    pub sender_role: SenderRole,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Display order: creation time, then the store-assigned id.
    pub fn display_key(&self) -> (DateTime<Utc>, i64) {
        (self.created_at, self.id)
    }
}

/// A row the send path asks the store to insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewMessage {
    pub ticket_id: TicketId,
    pub sender_id: UserId,
    pub sender_role: SenderRole,
    pub body: String,
}

/// Someone taking part in a ticket conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Participant {
    pub id: UserId,
    pub role: SenderRole,
}

impl Participant {
    pub fn new(id: UserId, role: SenderRole) -> Self {
        Self { id, role }
    }
}

/// One tracked connection on a presence channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceEntry {
    pub user_id: UserId,
    pub role: String,
}

/// Full membership of a presence channel at one point in time.
///
/// One entry per connection, so an identity with several open sessions
/// appears several times.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceSnapshot {
    pub entries: Vec<PresenceEntry>,
}

/// A raw event as delivered by a transport, before validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub event: String,
    pub topic: String,
    pub payload: serde_json::Value,
}

impl Frame {
    pub fn new(event: impl Into<String>, topic: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            event: event.into(),
            topic: topic.into(),
            payload,
        }
    }
}
