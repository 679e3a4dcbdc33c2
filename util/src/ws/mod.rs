// util/src/ws/mod.rs
pub mod axum_adapter;
pub mod handler_trait;
pub mod manager;
pub mod runtime;
pub mod serve;

pub use manager::{ConnectionId, PRESENCE_SYNC_EVENT, PresenceEntry, PresenceState, WebSocketManager};

use chrono::Utc;
use serde::Serialize;

/// Standard event envelope sent over WebSocket topics.
#[derive(Serialize)]
pub struct EventEnvelope<'a, T> {
    #[serde(rename = "type")]
    pub r#type: &'static str,
    pub event: &'a str,
    pub topic: &'a str,
    pub payload: T,
    pub ts: String,
}

impl<'a, T: Serialize> EventEnvelope<'a, T> {
    pub fn new(topic: &'a str, event: &'a str, payload: T) -> Self {
        Self {
            r#type: "event",
            event,
            topic,
            payload,
            ts: Utc::now().to_rfc3339(),
        }
    }

    /// Serialized form; `None` only if the payload refuses to serialize.
    pub fn to_json(&self) -> Option<String> {
        match serde_json::to_string(self) {
            Ok(json) => Some(json),
            Err(e) => {
                tracing::error!(event = self.event, topic = self.topic, "envelope serialization failed: {e}");
                None
            }
        }
    }
}

/// Broadcast a JSON-serialized `EventEnvelope` on `topic`.
pub async fn emit<T: Serialize>(ws: &WebSocketManager, topic: &str, event: &str, payload: &T) {
    if let Some(json) = EventEnvelope::new(topic, event, payload).to_json() {
        ws.broadcast(topic, json).await;
    }
}
