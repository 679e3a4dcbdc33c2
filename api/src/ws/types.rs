/// Every topic a client can end up on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientTopic {
    /// New rows of one ticket's conversation.
    TicketChat { ticket_id: i64 },
    /// Presence registry of one ticket's conversation.
    TicketPresence { ticket_id: i64 },
    /// Personal notification stream.
    UserNotifications { user_id: i64 },
}

impl ClientTopic {
    pub fn path(&self) -> String {
        match *self {
            ClientTopic::TicketChat { ticket_id } => format!("tickets:{ticket_id}"),
            ClientTopic::TicketPresence { ticket_id } => format!("tickets:{ticket_id}:presence"),
            ClientTopic::UserNotifications { user_id } => format!("notifications:user:{user_id}"),
        }
    }
}
