//! Ticket routes.
//!
//! - `POST /tickets` → open a ticket as requester
//! - `GET /tickets/{ticket_id}` → ticket details (participants)
//! - `PUT /tickets/{ticket_id}/assignee` → acquire an unassigned ticket (engineers)
//! - `GET /tickets/{ticket_id}/messages` → conversation history (participants)
//! - `POST /tickets/{ticket_id}/messages` → append to the conversation (participants)

use axum::{
    Router,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post, put},
};
use util::state::AppState;

use crate::auth::guards::{allow_authenticated, allow_staff, require_ticket_participant};

pub mod common;
pub mod get;
pub mod post;
pub mod put;

pub fn ticket_routes(app_state: AppState) -> Router<AppState> {
    let participant = Router::new()
        .route("/{ticket_id}", get(get::get_ticket))
        .route(
            "/{ticket_id}/messages",
            get(get::get_messages).post(post::create_message),
        )
        .route_layer(from_fn_with_state(app_state.clone(), require_ticket_participant));

    let staff = Router::new()
        .route("/{ticket_id}/assignee", put(put::acquire_ticket))
        .route_layer(from_fn_with_state(app_state, allow_staff));

    Router::new()
        .route("/", post(post::create_ticket))
        .route_layer(from_fn(allow_authenticated))
        .merge(participant)
        .merge(staff)
}
