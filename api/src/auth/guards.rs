use crate::auth::claims::AuthUser;
use crate::response::ApiResponse;
use axum::{
    Json,
    body::Body,
    extract::{FromRequestParts, Path, State},
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};
use db::models::{ticket_messages::SenderRole, tickets, user};
use std::collections::HashMap;
use util::state::AppState;

#[derive(serde::Serialize, Default)]
pub struct Empty;

type GuardError = (StatusCode, Json<ApiResponse<Empty>>);

/// A caller who is allowed into a ticket's conversation, and as whom.
///
/// Inserted into request extensions by [`require_ticket_participant`].
#[derive(Debug, Clone)]
pub struct TicketParticipant {
    pub ticket: tickets::Model,
    pub user: user::Model,
    pub role: SenderRole,
}

fn reject(status: StatusCode, message: &str) -> GuardError {
    (status, Json(ApiResponse::error(message)))
}

/// Helper to extract, validate user from request extensions and insert the back into the request
async fn extract_and_insert_authuser(mut req: Request<Body>) -> Result<(Request<Body>, AuthUser), GuardError> {
    let (mut parts, body) = req.into_parts();
    let user = AuthUser::from_request_parts(&mut parts, &())
        .await
        .map_err(|_| reject(StatusCode::UNAUTHORIZED, "Authentication required"))?;

    req = Request::from_parts(parts, body);
    req.extensions_mut().insert(user.clone());
    Ok((req, user))
}

/// Loads the row behind a token. A token for a deleted user is treated as
/// unauthenticated.
async fn load_user(app_state: &AppState, auth: &AuthUser) -> Result<user::Model, GuardError> {
    user::Model::find_by_id(app_state.db(), auth.0.sub)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, user_id = auth.0.sub, "failed to load user");
            reject(StatusCode::INTERNAL_SERVER_ERROR, "Database error while checking user")
        })?
        .ok_or_else(|| reject(StatusCode::UNAUTHORIZED, "Authentication required"))
}

/// Basic guard to ensure the request is authenticated.
pub async fn allow_authenticated(req: Request<Body>, next: Next) -> Result<Response, GuardError> {
    let (req, _user) = extract_and_insert_authuser(req).await?;

    Ok(next.run(req).await)
}

/// Engineers and admins only.
pub async fn allow_staff(
    State(app_state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, GuardError> {
    let (req, auth) = extract_and_insert_authuser(req).await?;
    let user = load_user(&app_state, &auth).await?;

    if !user.role.is_staff() {
        return Err(reject(StatusCode::FORBIDDEN, "Engineer access required"));
    }

    Ok(next.run(req).await)
}

/// Admits the ticket's requester, its assignee and admins.
///
/// Responds `404` for an unknown ticket and `403` for anyone else. On success
/// a [`TicketParticipant`] is available to the handler.
pub async fn require_ticket_participant(
    State(app_state): State<AppState>,
    Path(params): Path<HashMap<String, String>>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, GuardError> {
    let (mut req, auth) = extract_and_insert_authuser(req).await?;

    let ticket_id = params
        .get("ticket_id")
        .and_then(|s| s.parse::<i64>().ok())
        .filter(|id| *id > 0)
        .ok_or_else(|| reject(StatusCode::BAD_REQUEST, "Missing or invalid ticket_id"))?;

    let ticket = tickets::Model::find_by_id(app_state.db(), ticket_id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, ticket_id, "failed to load ticket");
            reject(StatusCode::INTERNAL_SERVER_ERROR, "Database error while checking ticket")
        })?
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "Ticket not found"))?;

    let user = load_user(&app_state, &auth).await?;

    let role = ticket
        .participant_role(&user)
        .ok_or_else(|| reject(StatusCode::FORBIDDEN, "Not a participant of this ticket"))?;

    req.extensions_mut().insert(TicketParticipant { ticket, user, role });
    Ok(next.run(req).await)
}
