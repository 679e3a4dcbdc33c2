use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use db::models::tickets::{self, Acquire};
use util::state::AppState;

use super::common::TicketResponse;
use crate::auth::AuthUser;
use crate::response::ApiResponse;

/// PUT /api/tickets/{ticket_id}/assignee
///
/// The calling engineer takes an unassigned ticket; it moves to `open`.
///
/// - `200 OK` with the updated ticket
/// - `404 Not Found` if the ticket does not exist
/// - `409 Conflict` if someone already acquired it
pub async fn acquire_ticket(
    State(app_state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    Path(ticket_id): Path<i64>,
) -> impl IntoResponse {
    match tickets::Model::acquire(app_state.db(), ticket_id, claims.sub).await {
        Ok(Acquire::Acquired(ticket)) => {
            tracing::info!(ticket_id, engineer_id = claims.sub, "ticket acquired");
            (
                StatusCode::OK,
                Json(ApiResponse::success(
                    Some(TicketResponse::from(ticket)),
                    "Ticket acquired",
                )),
            )
        }
        Ok(Acquire::AlreadyAcquired) => (
            StatusCode::CONFLICT,
            Json(ApiResponse::error("Ticket already acquired")),
        ),
        Ok(Acquire::NotFound) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::error("Ticket not found")),
        ),
        Err(e) => {
            tracing::error!(error = %e, ticket_id, "failed to acquire ticket");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Failed to acquire ticket")),
            )
        }
    }
}
