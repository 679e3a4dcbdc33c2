#[cfg(test)]
mod tests {
    use crate::helpers::{connect_ws, make_test_app, next_event, setup_test_data, spawn_server};
    use axum::{
        body::Body,
        http::{Request, header},
    };
    use serde_json::json;
    use std::time::Duration;
    use tower::ServiceExt;

    fn post_message(ticket_id: i64, token: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(format!("/api/tickets/{ticket_id}/messages"))
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json!({ "body": body }).to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn absent_recipient_is_notified() {
        let (app, state) = make_test_app().await;
        let data = setup_test_data(state.db(), true).await;
        let addr = spawn_server(app.clone()).await;

        let (mut inbox, _) = connect_ws(&addr.to_string(), "notifications", &data.requester_token()).await.unwrap();

        let response = app
            .oneshot(post_message(data.ticket.id, &data.engineer_token(), "  Replaced the toner  "))
            .await
            .unwrap();
        assert_eq!(response.status(), 201);

        let event = next_event(&mut inbox, Duration::from_secs(2)).await.expect("notification");
        assert_eq!(event["event"], "notification.message_created");
        assert_eq!(event["topic"], format!("notifications:user:{}", data.requester.id));
        assert_eq!(event["payload"]["ticket_id"], data.ticket.id);
        assert_eq!(event["payload"]["sender_id"], data.engineer.id);
        assert_eq!(event["payload"]["preview"], "Replaced the toner");
        assert!(event["payload"].get("recipient_id").is_none());
    }

    #[tokio::test]
    async fn present_recipient_is_not_notified() {
        let (app, state) = make_test_app().await;
        let data = setup_test_data(state.db(), true).await;
        let addr = spawn_server(app.clone()).await;

        let (mut inbox, _) = connect_ws(&addr.to_string(), "notifications", &data.requester_token()).await.unwrap();
        let presence_path = format!("tickets/{}/presence", data.ticket.id);
        let (_presence, _) = connect_ws(&addr.to_string(), &presence_path, &data.requester_token()).await.unwrap();

        let response = app
            .oneshot(post_message(data.ticket.id, &data.engineer_token(), "Fixed"))
            .await
            .unwrap();
        assert_eq!(response.status(), 201);

        assert!(next_event(&mut inbox, Duration::from_millis(300)).await.is_none());
    }

    #[tokio::test]
    async fn unassigned_ticket_has_nobody_to_notify() {
        let (app, state) = make_test_app().await;
        let data = setup_test_data(state.db(), false).await;
        let addr = spawn_server(app.clone()).await;

        let (mut inbox, _) = connect_ws(&addr.to_string(), "notifications", &data.engineer_token()).await.unwrap();

        let response = app
            .oneshot(post_message(data.ticket.id, &data.requester_token(), "Anyone?"))
            .await
            .unwrap();
        assert_eq!(response.status(), 201);

        assert!(next_event(&mut inbox, Duration::from_millis(300)).await.is_none());
    }
}
