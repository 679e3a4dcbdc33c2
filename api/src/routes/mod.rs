//! HTTP route entry point for `/api/...`.
//!
//! - `/health` → Health check endpoint (public)
//! - `/tickets` → Ticket creation, acquisition and the conversation history/insert primitives

use crate::routes::{health::health_routes, tickets::ticket_routes};
use axum::Router;
use util::state::AppState;

pub mod common;
pub mod health;
pub mod tickets;

/// Builds the router for every HTTP endpoint, to be nested under `/api`.
pub fn routes(app_state: AppState) -> Router<AppState> {
    Router::new()
        .nest("/health", health_routes())
        .nest("/tickets", ticket_routes(app_state.clone()))
        .with_state(app_state)
}
