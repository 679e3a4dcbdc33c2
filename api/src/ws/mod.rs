//! WebSocket entry points under `/ws`.
//!
//! - `/tickets/{ticket_id}` → change feed of the ticket's messages
//! - `/tickets/{ticket_id}/presence` → who has the conversation open
//! - `/notifications` → the caller's personal notification stream

use axum::Router;
use util::state::AppState;

use crate::ws::{notifications::ws_notification_routes, tickets::ws_ticket_routes};

pub mod core;
pub mod notifications;
pub mod tickets;
pub mod types;

pub fn ws_routes(app_state: AppState) -> Router<AppState> {
    Router::new()
        .nest("/tickets", ws_ticket_routes(app_state.clone()))
        .nest("/notifications", ws_notification_routes())
        .with_state(app_state)
}
