use axum::{Router, middleware::from_fn, routing::get};
use util::state::AppState;

use crate::auth::guards::allow_authenticated;
use handlers::notifications_handler;

pub mod emit;
pub mod handlers;
pub mod payload;

pub fn ws_notification_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(notifications_handler))
        .route_layer(from_fn(allow_authenticated))
}
