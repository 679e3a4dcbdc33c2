use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use db::models::{
    ticket_messages,
    tickets::{self, TicketPriority},
};
use util::state::AppState;
use validator::Validate;

use super::common::{CreateMessageRequest, CreateTicketRequest, TicketResponse};
use crate::auth::AuthUser;
use crate::auth::guards::TicketParticipant;
use crate::response::ApiResponse;
use crate::routes::common::format_validation_errors;
use crate::ws::notifications::{emit as notification_emit, payload as notification_payload};
use crate::ws::tickets::{emit as ticket_emit, payload::Message};
use crate::ws::types::ClientTopic;

/// POST /api/tickets
///
/// Opens a ticket with the caller as requester. New tickets start as `new`
/// and unassigned.
///
/// ```json
/// { "subject": "VPN down", "description": "Since this morning", "priority": "high" }
/// ```
///
/// - `201 Created` with the ticket
/// - `400 Bad Request` on validation failure
pub async fn create_ticket(
    State(app_state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    Json(req): Json<CreateTicketRequest>,
) -> impl IntoResponse {
    if let Err(validation_errors) = req.validate() {
        let error_message = format_validation_errors(&validation_errors);
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<Option<TicketResponse>>::error(error_message)),
        );
    }

    let priority = req.priority.unwrap_or(TicketPriority::Medium);
    match tickets::Model::create(app_state.db(), claims.sub, &req.subject, &req.description, priority).await {
        Ok(ticket) => {
            tracing::info!(ticket_id = ticket.id, requester_id = claims.sub, "ticket created");
            (
                StatusCode::CREATED,
                Json(ApiResponse::success(
                    Some(TicketResponse::from(ticket)),
                    "Ticket created successfully",
                )),
            )
        }
        Err(e) => {
            tracing::error!(error = %e, requester_id = claims.sub, "failed to create ticket");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Failed to create ticket")),
            )
        }
    }
}

/// POST /api/tickets/{ticket_id}/messages
///
/// Appends one message as the caller, in the role they hold on the ticket.
/// The new row is broadcast on the ticket's change feed; if the other side
/// does not have the conversation open they also get a notification.
///
/// ```json
/// { "body": "Have you tried turning it off and on again?" }
/// ```
///
/// - `201 Created` with the stored message
/// - `400 Bad Request` if the body is empty or whitespace
/// - `403 Forbidden` if the caller is not a participant
pub async fn create_message(
    State(app_state): State<AppState>,
    Extension(participant): Extension<TicketParticipant>,
    Json(req): Json<CreateMessageRequest>,
) -> impl IntoResponse {
    if req.body.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<Option<Message>>::error("Message body must not be empty")),
        );
    }

    let ticket = &participant.ticket;
    let row = match ticket_messages::Model::create(
        app_state.db(),
        ticket.id,
        participant.user.id,
        participant.role,
        &req.body,
    )
    .await
    {
        Ok(row) => row,
        Err(e) => {
            tracing::error!(error = %e, ticket_id = ticket.id, "failed to store message");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Failed to send message")),
            );
        }
    };

    let message = Message::from(&row);
    ticket_emit::message_created(app_state.ws(), message.clone()).await;

    if let Some(recipient_id) = ticket.counterpart_of(participant.role) {
        let presence_topic = ClientTopic::TicketPresence { ticket_id: ticket.id }.path();
        if !app_state.ws().is_user_present_on(&presence_topic, recipient_id).await {
            let notification = notification_payload::MessageNotification {
                ticket_id: ticket.id,
                message_id: row.id,
                sender_id: row.sender_id,
                preview: notification_payload::preview(&row.body),
            };
            notification_emit::message_created(app_state.ws(), recipient_id, notification).await;
        }
    }

    (
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(message), "Message sent")),
    )
}
