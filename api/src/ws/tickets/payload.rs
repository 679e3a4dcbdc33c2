use db::models::ticket_messages::{self, SenderRole};
use serde::Serialize;

/// Wire shape of one conversation row.
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    pub id: i64,
    pub ticket_id: i64,
    pub sender_id: i64,
    pub sender_role: SenderRole,
    pub body: String,
    pub created_at: String, // RFC3339
}

impl From<&ticket_messages::Model> for Message {
    fn from(m: &ticket_messages::Model) -> Self {
        Self {
            id: m.id,
            ticket_id: m.ticket_id,
            sender_id: m.sender_id,
            sender_role: m.sender_role,
            body: m.body.clone(),
            created_at: m.created_at.to_rfc3339(),
        }
    }
}
