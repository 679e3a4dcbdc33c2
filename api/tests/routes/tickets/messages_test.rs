#[cfg(test)]
mod tests {
    use super::super::{read_json, request};
    use crate::helpers::{make_test_app, setup_test_data};
    use axum::http::StatusCode;
    use db::models::ticket_messages::{self, SenderRole};
    use serde_json::json;
    use tower::ServiceExt;

    #[tokio::test]
    async fn history_is_ordered_and_carries_roles() {
        let (app, state) = make_test_app().await;
        let data = setup_test_data(state.db(), true).await;
        let t = data.ticket.id;

        ticket_messages::Model::create(state.db(), t, data.requester.id, SenderRole::Requester, "It is on fire")
            .await
            .unwrap();
        ticket_messages::Model::create(state.db(), t, data.engineer.id, SenderRole::Responder, "On my way")
            .await
            .unwrap();

        let uri = format!("/api/tickets/{t}/messages");
        let response = app
            .oneshot(request("GET", &uri, Some(&data.requester_token()), None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = read_json(response).await;
        let messages = json["data"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["body"], "It is on fire");
        assert_eq!(messages[0]["sender_role"], "requester");
        assert_eq!(messages[1]["body"], "On my way");
        assert_eq!(messages[1]["sender_role"], "responder");
        assert!(messages[0]["id"].as_i64() < messages[1]["id"].as_i64());
    }

    #[tokio::test]
    async fn empty_history_is_an_empty_array() {
        let (app, state) = make_test_app().await;
        let data = setup_test_data(state.db(), false).await;

        let uri = format!("/api/tickets/{}/messages", data.ticket.id);
        let response = app
            .oneshot(request("GET", &uri, Some(&data.requester_token()), None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(read_json(response).await["data"], json!([]));
    }

    #[tokio::test]
    async fn sender_role_comes_from_the_ticket_not_the_body() {
        let (app, state) = make_test_app().await;
        let data = setup_test_data(state.db(), true).await;

        let uri = format!("/api/tickets/{}/messages", data.ticket.id);
        let body = json!({ "body": "Try the other printer", "sender_role": "requester" });
        let response = app
            .oneshot(request("POST", &uri, Some(&data.engineer_token()), Some(body)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let json = read_json(response).await;
        assert_eq!(json["message"], "Message sent");
        assert_eq!(json["data"]["sender_id"], data.engineer.id);
        assert_eq!(json["data"]["sender_role"], "responder");
        assert_eq!(json["data"]["ticket_id"], data.ticket.id);
    }

    #[tokio::test]
    async fn whitespace_body_is_rejected_and_not_stored() {
        let (app, state) = make_test_app().await;
        let data = setup_test_data(state.db(), false).await;

        let uri = format!("/api/tickets/{}/messages", data.ticket.id);
        let response = app
            .oneshot(request("POST", &uri, Some(&data.requester_token()), Some(json!({ "body": "  \n " }))))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(read_json(response).await["message"], "Message body must not be empty");
        let stored = ticket_messages::Model::find_all_for_ticket(state.db(), data.ticket.id).await.unwrap();
        assert!(stored.is_empty());
    }

    #[tokio::test]
    async fn bystanders_cannot_read_or_write() {
        let (app, state) = make_test_app().await;
        let data = setup_test_data(state.db(), true).await;
        let uri = format!("/api/tickets/{}/messages", data.ticket.id);
        let token = data.outsider_token();

        let response = app.clone().oneshot(request("GET", &uri, Some(&token), None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = app
            .oneshot(request("POST", &uri, Some(&token), Some(json!({ "body": "hi" }))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn unknown_ticket_is_not_found() {
        let (app, state) = make_test_app().await;
        let data = setup_test_data(state.db(), false).await;

        let response = app
            .oneshot(request("GET", "/api/tickets/777/messages", Some(&data.requester_token()), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
