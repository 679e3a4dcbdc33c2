use crate::auth::AuthUser;
use crate::ws::types::ClientTopic;
use axum::{
    Extension,
    extract::{State, WebSocketUpgrade},
    response::Response,
};
use serde::de::IgnoredAny;
use std::sync::Arc;
use util::state::AppState;
use util::ws::axum_adapter::ws_route;
use util::ws::handler_trait::WsHandler;
use util::ws::runtime::WsContext;
use util::ws::serve::WsServerOptions;

pub struct NotificationWsHandler;

impl WsHandler for NotificationWsHandler {
    type In = IgnoredAny;

    async fn on_message(&self, ctx: &WsContext, _msg: Self::In) {
        tracing::debug!(topic = %ctx.topic, "ignoring client frame on notifications");
    }
}

/// GET /ws/notifications
pub async fn notifications_handler(
    ws: WebSocketUpgrade,
    State(app_state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
) -> Response {
    let topic = ClientTopic::UserNotifications { user_id: claims.sub }.path();

    ws_route(
        ws,
        app_state.ws_clone(),
        topic,
        None,
        Arc::new(NotificationWsHandler),
        WsServerOptions::from_config(),
    )
}
