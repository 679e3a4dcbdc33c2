// util/ws/axum_adapter.rs
use std::sync::Arc;

use axum::{
    extract::{WebSocketUpgrade, ws::WebSocket},
    response::Response,
};

use super::handler_trait::WsHandler;
use super::serve::{WsServerOptions, serve_topic};
use super::{PresenceEntry, WebSocketManager};

/// Completes a WebSocket upgrade and serves `topic` on the new socket.
///
/// Pass `presence` to track the socket on the topic while it is open.
pub fn ws_route<H: WsHandler>(
    ws: WebSocketUpgrade,
    manager: WebSocketManager,
    topic: String,
    presence: Option<PresenceEntry>,
    handler: Arc<H>,
    opts: WsServerOptions,
) -> Response {
    ws.on_upgrade(move |socket: WebSocket| async move {
        serve_topic(socket, manager, topic, presence, handler, opts).await;
    })
}
