use db::models::ticket_messages::SenderRole;
use db::models::tickets::{self, TicketPriority, TicketStatus};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateTicketRequest {
    #[validate(length(min = 1, max = 200, message = "Subject must be between 1 and 200 characters"))]
    pub subject: String,
    #[validate(length(min = 1, max = 10000, message = "Description must be between 1 and 10000 characters"))]
    pub description: String,
    pub priority: Option<TicketPriority>,
}

#[derive(Debug, Deserialize)]
pub struct CreateMessageRequest {
    pub body: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TicketResponse {
    pub id: i64,
    pub requester_id: i64,
    pub subject: String,
    pub description: String,
    pub priority: TicketPriority,
    pub status: TicketStatus,
    pub assignee_id: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<tickets::Model> for TicketResponse {
    fn from(t: tickets::Model) -> Self {
        Self {
            id: t.id,
            requester_id: t.requester_id,
            subject: t.subject,
            description: t.description,
            priority: t.priority,
            status: t.status,
            assignee_id: t.assignee_id,
            created_at: t.created_at.to_rfc3339(),
            updated_at: t.updated_at.to_rfc3339(),
        }
    }
}

/// Ticket plus how the caller takes part in it.
#[derive(Debug, Serialize, Deserialize)]
pub struct TicketView {
    #[serde(flatten)]
    pub ticket: TicketResponse,
    pub role: SenderRole,
    /// Whom the caller is talking to; `None` until an engineer acquires the ticket.
    pub counterpart_id: Option<i64>,
}
