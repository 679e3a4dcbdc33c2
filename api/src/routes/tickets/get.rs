use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use db::models::ticket_messages;
use util::state::AppState;

use super::common::{TicketResponse, TicketView};
use crate::auth::guards::TicketParticipant;
use crate::response::ApiResponse;
use crate::ws::tickets::payload::Message;

/// GET /api/tickets/{ticket_id}
///
/// Ticket details with the caller's conversation role and counterpart.
pub async fn get_ticket(Extension(participant): Extension<TicketParticipant>) -> impl IntoResponse {
    let counterpart_id = participant.ticket.counterpart_of(participant.role);
    let view = TicketView {
        ticket: TicketResponse::from(participant.ticket),
        role: participant.role,
        counterpart_id,
    };

    (
        StatusCode::OK,
        Json(ApiResponse::success(view, "Ticket retrieved successfully")),
    )
}

/// GET /api/tickets/{ticket_id}/messages
///
/// The whole conversation, ordered by `created_at` then `id`.
///
/// - `200 OK` with a (possibly empty) array of messages
/// - `403 Forbidden` if the caller is not a participant
/// - `404 Not Found` if the ticket does not exist
pub async fn get_messages(
    State(app_state): State<AppState>,
    Extension(participant): Extension<TicketParticipant>,
) -> impl IntoResponse {
    let ticket_id = participant.ticket.id;

    match ticket_messages::Model::find_all_for_ticket(app_state.db(), ticket_id).await {
        Ok(rows) => {
            let messages: Vec<Message> = rows.iter().map(Message::from).collect();
            (
                StatusCode::OK,
                Json(ApiResponse::success(messages, "Messages retrieved successfully")),
            )
        }
        Err(e) => {
            tracing::error!(error = %e, ticket_id, "failed to load ticket history");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<Vec<Message>>::error("Failed to retrieve messages")),
            )
        }
    }
}
