use crate::ws::{ConnectionId, EventEnvelope, WebSocketManager};
use axum::extract::ws::{Message, Utf8Bytes};
use serde::Serialize;
use tokio::sync::mpsc;

/// The client's writer queue is gone; the socket is closing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientGone;

/// Per-socket handle given to a [`WsHandler`](super::handler_trait::WsHandler).
pub struct WsContext {
    pub topic: String,
    pub ws: WebSocketManager,
    /// Authenticated user behind this socket, if any.
    pub user_id: Option<i64>,
    /// Presence registration of this socket, if it is tracked.
    pub connection: Option<ConnectionId>,
    out_tx: mpsc::Sender<Message>,
}

impl WsContext {
    pub fn new(
        topic: String,
        ws: WebSocketManager,
        out_tx: mpsc::Sender<Message>,
        user_id: Option<i64>,
        connection: Option<ConnectionId>,
    ) -> Self {
        Self {
            topic,
            ws,
            user_id,
            connection,
            out_tx,
        }
    }

    /// Send a single text frame to this client only.
    pub async fn reply_text(&self, text: impl Into<Utf8Bytes>) -> Result<(), ClientGone> {
        self.send(Message::Text(text.into())).await
    }

    /// Send an enveloped event to this client only.
    pub async fn reply_event<T: Serialize>(&self, event: &str, payload: &T) -> Result<(), ClientGone> {
        match EventEnvelope::new(&self.topic, event, payload).to_json() {
            Some(json) => self.reply_text(json).await,
            None => Ok(()),
        }
    }

    /// Send a WS-level pong to this client.
    pub async fn reply_pong(&self, payload: bytes::Bytes) -> Result<(), ClientGone> {
        self.send(Message::Pong(payload)).await
    }

    /// Send any raw WS frame to this client.
    pub async fn send(&self, msg: Message) -> Result<(), ClientGone> {
        self.out_tx.send(msg).await.map_err(|_| ClientGone)
    }
}
