use axum::{Router, middleware::from_fn_with_state, routing::get};
use util::state::AppState;

use crate::auth::guards::require_ticket_participant;
use crate::ws::tickets::handlers::{ticket_feed_handler, ticket_presence_handler};

pub mod common;
pub mod emit;
pub mod handlers;
pub mod payload;
pub mod ws_handlers;

pub fn ws_ticket_routes(app_state: AppState) -> Router<AppState> {
    Router::new()
        .route("/{ticket_id}", get(ticket_feed_handler))
        .route("/{ticket_id}/presence", get(ticket_presence_handler))
        .route_layer(from_fn_with_state(app_state, require_ticket_participant))
}
