use serde::Serialize;
use util::ws::WebSocketManager;

use crate::ws::core::{envelope, event::Event};
use crate::ws::types::ClientTopic;

use super::payload::MessageNotification;

#[derive(Debug, Serialize)]
pub struct NotificationMessageCreated {
    #[serde(flatten)]
    pub payload: MessageNotification,
    #[serde(skip)]
    pub recipient_id: i64,
}

impl Event for NotificationMessageCreated {
    const NAME: &'static str = "notification.message_created";
    fn topic(&self) -> ClientTopic {
        ClientTopic::UserNotifications {
            user_id: self.recipient_id,
        }
    }
}

pub async fn message_created(ws: &WebSocketManager, recipient_id: i64, payload: MessageNotification) {
    envelope::publish(ws, &NotificationMessageCreated { payload, recipient_id }).await;
}
