use axum::extract::ws::{Message, WebSocket};
use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast::error::RecvError, mpsc};
use tokio::time;

use super::handler_trait::WsHandler;
use super::runtime::WsContext;
use super::{PresenceEntry, WebSocketManager};
use crate::config::AppConfig;

#[derive(Debug, Clone, Copy)]
pub struct WsServerOptions {
    pub ws_ping_sec: u64,
    /// Close the socket after this many seconds without any inbound frame.
    pub idle_timeout_sec: Option<u64>,
    pub enable_app_ping: bool,
}

impl Default for WsServerOptions {
    fn default() -> Self {
        Self {
            ws_ping_sec: 30,
            idle_timeout_sec: None,
            enable_app_ping: true,
        }
    }
}

impl WsServerOptions {
    /// Ping cadence and heartbeat expiry taken from [`AppConfig`].
    pub fn from_config() -> Self {
        let cfg = AppConfig::global();
        Self {
            ws_ping_sec: cfg.ws_ping_sec.max(1),
            idle_timeout_sec: (cfg.ws_idle_timeout_sec > 0).then_some(cfg.ws_idle_timeout_sec),
            enable_app_ping: true,
        }
    }
}

/// Serves one socket bound to one topic until either side goes away.
///
/// Broadcasts on `topic` are forwarded to the client; client frames are parsed
/// into `H::In` and dispatched. When `presence` is given the socket is tracked
/// on the topic for its whole lifetime and untracked on the way out, whatever
/// the reason the session ended.
pub async fn serve_topic<H: WsHandler>(
    socket: WebSocket,
    manager: WebSocketManager,
    topic: String,
    presence: Option<PresenceEntry>,
    handler: Arc<H>,
    opts: WsServerOptions,
) {
    let mut rx = manager.subscribe(&topic).await;
    let (mut sink, mut socket_rx) = socket.split();

    let (out_tx, mut out_rx) = mpsc::channel::<Message>(64);
    let writer_task = tokio::spawn(async move {
        while let Some(frame) = out_rx.recv().await {
            if sink.send(frame).await.is_err() {
                break;
            }
        }
    });

    // S→C: forward broadcasts on this topic
    let forward_task = {
        let out_tx = out_tx.clone();
        let topic = topic.clone();
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(msg) => {
                        if out_tx.send(Message::Text(msg.into())).await.is_err() {
                            tracing::info!("Client disconnected while sending to '{topic}'");
                            break;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "Slow client on '{topic}' dropped oldest frames");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    };

    let ping_task = {
        let out_tx = out_tx.clone();
        tokio::spawn(async move {
            loop {
                time::sleep(Duration::from_secs(opts.ws_ping_sec)).await;
                if out_tx.send(Message::Ping(Bytes::new())).await.is_err() {
                    break;
                }
            }
        })
    };

    let user_id = presence.as_ref().map(|p| p.user_id);
    let connection = match presence {
        Some(entry) => Some(manager.track(&topic, entry).await),
        None => None,
    };

    let ctx = WsContext::new(topic.clone(), manager.clone(), out_tx.clone(), user_id, connection);
    handler.on_open(&ctx).await;

    let idle = opts.idle_timeout_sec.map(Duration::from_secs);
    loop {
        let next = match idle {
            Some(limit) => match time::timeout(limit, socket_rx.next()).await {
                Ok(next) => next,
                Err(_) => {
                    tracing::info!("Heartbeat expired on '{}'", ctx.topic);
                    break;
                }
            },
            None => socket_rx.next().await,
        };

        let msg = match next {
            Some(Ok(msg)) => msg,
            Some(Err(e)) => {
                tracing::debug!("WS read error on '{}': {e}", ctx.topic);
                break;
            }
            None => break,
        };

        match msg {
            Message::Text(text) => {
                let raw = text.as_str();
                if opts.enable_app_ping && is_app_ping(raw) {
                    let _ = ctx.reply_event("pong", &serde_json::json!({})).await;
                    continue;
                }
                match serde_json::from_str::<H::In>(raw) {
                    Ok(parsed) => handler.on_message(&ctx, parsed).await,
                    Err(e) => tracing::warn!("WS invalid message on '{}': {e}; raw={raw}", ctx.topic),
                }
            }
            Message::Ping(payload) => {
                let _ = ctx.reply_pong(payload).await;
            }
            Message::Pong(_) => {}
            Message::Binary(_) => {
                tracing::warn!("Ignoring binary on topic '{}'", ctx.topic);
            }
            Message::Close(_) => break,
        }
    }

    handler.on_close(&ctx).await;
    if let Some(id) = connection {
        manager.untrack(&topic, id).await;
    }

    forward_task.abort();
    ping_task.abort();
    let _ = forward_task.await;
    let _ = ping_task.await;
    drop(ctx);
    drop(out_tx);
    let _ = writer_task.await;
    tracing::info!("WS session ended for topic '{topic}'");
}

fn is_app_ping(raw: &str) -> bool {
    matches!(
        serde_json::from_str::<Value>(raw),
        Ok(Value::Object(map)) if map.get("type").and_then(Value::as_str) == Some("ping")
    )
}
