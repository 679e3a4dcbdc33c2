use super::ws_handlers::{TicketFeedHandler, TicketPresenceHandler};
use crate::auth::guards::TicketParticipant;
use crate::ws::types::ClientTopic;
use axum::{
    Extension,
    extract::{State, WebSocketUpgrade},
    response::Response,
};
use std::sync::Arc;
use util::state::AppState;
use util::ws::PresenceEntry;
use util::ws::axum_adapter::ws_route;
use util::ws::serve::WsServerOptions;

/// GET /ws/tickets/{ticket_id}
///
/// Confirms the subscription with `ticket.subscribed`, then streams
/// `ticket.message_created` for every row inserted on the ticket.
pub async fn ticket_feed_handler(
    ws: WebSocketUpgrade,
    State(app_state): State<AppState>,
    Extension(participant): Extension<TicketParticipant>,
) -> Response {
    let ticket_id = participant.ticket.id;
    let topic = ClientTopic::TicketChat { ticket_id }.path();

    ws_route(
        ws,
        app_state.ws_clone(),
        topic,
        None,
        Arc::new(TicketFeedHandler { ticket_id }),
        WsServerOptions::from_config(),
    )
}

/// GET /ws/tickets/{ticket_id}/presence
///
/// Tracks the caller on the ticket while the socket is open and streams
/// `presence.sync` snapshots.
pub async fn ticket_presence_handler(
    ws: WebSocketUpgrade,
    State(app_state): State<AppState>,
    Extension(participant): Extension<TicketParticipant>,
) -> Response {
    let topic = ClientTopic::TicketPresence {
        ticket_id: participant.ticket.id,
    }
    .path();
    let entry = PresenceEntry {
        user_id: participant.user.id,
        role: participant.role.to_string(),
    };

    ws_route(
        ws,
        app_state.ws_clone(),
        topic,
        Some(entry),
        Arc::new(TicketPresenceHandler),
        WsServerOptions::from_config(),
    )
}
