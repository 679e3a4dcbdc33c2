use api::{routes::routes, ws::ws_routes};
use axum::{Router, body::Body, http::Request, response::Response};
use ctor::ctor;
use std::convert::Infallible;
use tower::ServiceExt;
use tower::util::BoxCloneService;
use util::{config::AppConfig, state::AppState, ws::WebSocketManager};

pub type TestApp = BoxCloneService<Request<Body>, Response, Infallible>;

#[ctor]
fn setup_tests() {
    AppConfig::set_env("test");
    AppConfig::set_jwt_secret("helpdesk-test-secret");
    AppConfig::set_ws_ping_sec(30);
    AppConfig::set_ws_idle_timeout_sec(0);
}

/// Fresh in-memory database and topic manager per call.
pub async fn make_test_app() -> (TestApp, AppState) {
    let db = db::test_utils::setup_test_db().await;
    let app_state = AppState::new(db, WebSocketManager::new());

    let router = Router::new()
        .nest("/api", routes(app_state.clone()))
        .nest("/ws", ws_routes(app_state.clone()))
        .with_state(app_state.clone());

    (router.into_service().boxed_clone(), app_state)
}
