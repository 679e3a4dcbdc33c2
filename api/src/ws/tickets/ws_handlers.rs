use serde::de::IgnoredAny;
use util::ws::handler_trait::WsHandler;
use util::ws::runtime::WsContext;
use util::ws::{PRESENCE_SYNC_EVENT, PresenceState};

use super::common::{PresenceIncoming, SUBSCRIBED_EVENT, Subscribed};

/// Change feed: server to client only.
///
/// Opens with a `ticket.subscribed` frame so a client knows every insert from
/// then on reaches it.
pub struct TicketFeedHandler {
    pub ticket_id: i64,
}

impl WsHandler for TicketFeedHandler {
    type In = IgnoredAny;

    async fn on_open(&self, ctx: &WsContext) {
        let ack = Subscribed { ticket_id: self.ticket_id };
        if ctx.reply_event(SUBSCRIBED_EVENT, &ack).await.is_err() {
            tracing::debug!(topic = %ctx.topic, "client left before the feed was confirmed");
        }
    }

    async fn on_message(&self, ctx: &WsContext, _msg: Self::In) {
        tracing::debug!(topic = %ctx.topic, "ignoring client frame on change feed");
    }
}

pub struct TicketPresenceHandler;

impl WsHandler for TicketPresenceHandler {
    type In = PresenceIncoming;

    async fn on_open(&self, ctx: &WsContext) {
        tracing::info!(topic = %ctx.topic, user_id = ?ctx.user_id, connection = ?ctx.connection, "presence joined");
    }

    async fn on_message(&self, ctx: &WsContext, msg: Self::In) {
        match msg {
            PresenceIncoming::Sync => {
                let state = PresenceState {
                    entries: ctx.ws.presence_state(&ctx.topic).await,
                };
                let _ = ctx.reply_event(PRESENCE_SYNC_EVENT, &state).await;
            }
        }
    }

    async fn on_close(&self, ctx: &WsContext) {
        tracing::info!(topic = %ctx.topic, user_id = ?ctx.user_id, connection = ?ctx.connection, "presence left");
    }
}
