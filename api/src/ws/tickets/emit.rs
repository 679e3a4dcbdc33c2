use serde::Serialize;
use util::ws::WebSocketManager;

use crate::ws::core::{envelope, event::Event};
use crate::ws::types::ClientTopic;

use super::payload;

#[derive(Debug, Serialize)]
pub struct TicketMessageCreated {
    #[serde(flatten)]
    pub payload: payload::Message,
}

impl Event for TicketMessageCreated {
    const NAME: &'static str = "ticket.message_created";
    fn topic(&self) -> ClientTopic {
        ClientTopic::TicketChat {
            ticket_id: self.payload.ticket_id,
        }
    }
}

pub async fn message_created(ws: &WebSocketManager, msg: payload::Message) {
    envelope::publish(ws, &TicketMessageCreated { payload: msg }).await;
}
