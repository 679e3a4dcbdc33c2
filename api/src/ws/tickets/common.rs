use serde::{Deserialize, Serialize};

/// First frame on a change-feed socket, sent once the socket is subscribed.
pub const SUBSCRIBED_EVENT: &str = "ticket.subscribed";

#[derive(Debug, Serialize)]
pub struct Subscribed {
    pub ticket_id: i64,
}

/// Frames a client may send on a ticket's presence socket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PresenceIncoming {
    /// Ask for the current snapshot, delivered to this socket only.
    Sync,
}
