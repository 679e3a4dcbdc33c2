#[cfg(test)]
mod tests {
    use crate::helpers::{connect_feed, connect_ws, make_test_app, next_event, setup_test_data, spawn_server};
    use axum::{
        body::Body,
        http::{Request, header},
    };
    use futures_util::SinkExt;
    use serde_json::json;
    use std::time::Duration;
    use tokio_tungstenite::connect_async;
    use tokio_tungstenite::tungstenite::{Error, Message, client::IntoClientRequest};
    use tower::ServiceExt;

    const WAIT: Duration = Duration::from_secs(2);

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
    async fn unauthenticated_socket_is_refused() {
        let (app, state) = make_test_app().await;
        let data = setup_test_data(state.db(), true).await;
        let addr = spawn_server(app).await;

        let url = format!("ws://{addr}/ws/tickets/{}", data.ticket.id);
        let result = connect_async(url.into_client_request().unwrap()).await;

        match result {
            Ok(_) => panic!("Unauthenticated user should not connect"),
            Err(Error::Http(resp)) => {
                assert_eq!(resp.status(), 401);
                let body = std::str::from_utf8(resp.body().as_ref().unwrap()).unwrap();
                let json: serde_json::Value = serde_json::from_str(body).unwrap();
                assert_eq!(json["message"], "Authentication required");
            }
            Err(e) => panic!("Unexpected error: {e:?}"),
        }
    }

    #[tokio::test]
    async fn bystander_socket_is_forbidden() {
        let (app, state) = make_test_app().await;
        let data = setup_test_data(state.db(), true).await;
        let addr = spawn_server(app).await;

        let path = format!("tickets/{}", data.ticket.id);
        match connect_ws(&addr.to_string(), &path, &data.outsider_token()).await {
            Err(Error::Http(resp)) => assert_eq!(resp.status(), 403),
            other => panic!("expected 403, got {:?}", other.map(|_| ())),
        }
    }

    #[tokio::test]
    async fn feed_opens_with_a_subscription_frame() {
        let (app, state) = make_test_app().await;
        let data = setup_test_data(state.db(), true).await;
        let addr = spawn_server(app).await;

        let path = format!("tickets/{}", data.ticket.id);
        let (mut ws, _) = connect_ws(&addr.to_string(), &path, &data.requester_token()).await.unwrap();

        let ack = next_event(&mut ws, WAIT).await.expect("subscription frame");
        assert_eq!(ack["type"], "event");
        assert_eq!(ack["event"], "ticket.subscribed");
        assert_eq!(ack["topic"], format!("tickets:{}", data.ticket.id));
        assert_eq!(ack["payload"]["ticket_id"], data.ticket.id);
        assert!(next_event(&mut ws, Duration::from_millis(200)).await.is_none());
        ws.close(None).await.unwrap();
    }

    #[tokio::test]
    async fn both_sides_receive_each_inserted_row() {
        let (app, state) = make_test_app().await;
        let data = setup_test_data(state.db(), true).await;
        let addr = spawn_server(app.clone()).await;

        let mut requester_ws = connect_feed(&addr.to_string(), data.ticket.id, &data.requester_token()).await;
        let mut engineer_ws = connect_feed(&addr.to_string(), data.ticket.id, &data.engineer_token()).await;

        let response = app
            .oneshot(post_message(data.ticket.id, &data.requester_token(), "Hello"))
            .await
            .unwrap();
        assert_eq!(response.status(), 201);

        for ws in [&mut requester_ws, &mut engineer_ws] {
            let event = next_event(ws, WAIT).await.expect("feed event");
            assert_eq!(event["type"], "event");
            assert_eq!(event["event"], "ticket.message_created");
            assert_eq!(event["topic"], format!("tickets:{}", data.ticket.id));
            assert_eq!(event["payload"]["body"], "Hello");
            assert_eq!(event["payload"]["sender_id"], data.requester.id);
            assert_eq!(event["payload"]["sender_role"], "requester");
            assert!(event["ts"].is_string());
        }

        requester_ws.close(None).await.unwrap();
        engineer_ws.close(None).await.unwrap();
    }

    #[tokio::test]
    async fn rows_of_other_tickets_are_not_delivered() {
        let (app, state) = make_test_app().await;
        let data = setup_test_data(state.db(), true).await;
        let other = db::models::tickets::Model::create(
            state.db(),
            data.requester.id,
            "Another",
            "Unrelated",
            db::models::tickets::TicketPriority::Low,
        )
        .await
        .unwrap();
        let addr = spawn_server(app.clone()).await;

        let mut ws = connect_feed(&addr.to_string(), data.ticket.id, &data.requester_token()).await;

        let response = app
            .oneshot(post_message(other.id, &data.requester_token(), "elsewhere"))
            .await
            .unwrap();
        assert_eq!(response.status(), 201);

        assert!(next_event(&mut ws, Duration::from_millis(300)).await.is_none());
        ws.close(None).await.unwrap();
    }

    #[tokio::test]
    async fn app_ping_is_answered_with_pong() {
        let (app, state) = make_test_app().await;
        let data = setup_test_data(state.db(), true).await;
        let addr = spawn_server(app).await;

        let mut ws = connect_feed(&addr.to_string(), data.ticket.id, &data.engineer_token()).await;

        ws.send(Message::Text(json!({ "type": "ping" }).to_string().into())).await.unwrap();

        let event = next_event(&mut ws, WAIT).await.expect("pong");
        assert_eq!(event["event"], "pong");
        ws.close(None).await.unwrap();
    }
}
