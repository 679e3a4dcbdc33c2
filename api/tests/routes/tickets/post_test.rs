#[cfg(test)]
mod tests {
    use super::super::{read_json, request};
    use crate::helpers::{TestData, make_test_app, setup_test_data};
    use axum::http::StatusCode;
    use serde_json::json;
    use tower::ServiceExt;

    #[tokio::test]
    async fn requester_opens_a_new_unassigned_ticket() {
        let (app, state) = make_test_app().await;
        let data = setup_test_data(state.db(), false).await;

        let body = json!({ "subject": "VPN down", "description": "Since this morning", "priority": "low" });
        let response = app
            .oneshot(request("POST", "/api/tickets", Some(&data.requester_token()), Some(body)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let json = read_json(response).await;
        assert_eq!(json["success"], true);
        assert_eq!(json["message"], "Ticket created successfully");
        assert_eq!(json["data"]["requester_id"], data.requester.id);
        assert_eq!(json["data"]["subject"], "VPN down");
        assert_eq!(json["data"]["priority"], "low");
        assert_eq!(json["data"]["status"], "new");
        assert!(json["data"]["assignee_id"].is_null());
    }

    #[tokio::test]
    async fn priority_defaults_to_medium() {
        let (app, state) = make_test_app().await;
        let data = setup_test_data(state.db(), false).await;

        let body = json!({ "subject": "Mouse", "description": "Left click sticks" });
        let response = app
            .oneshot(request("POST", "/api/tickets", Some(&data.outsider_token()), Some(body)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(read_json(response).await["data"]["priority"], "medium");
    }

    #[tokio::test]
    async fn empty_subject_is_rejected() {
        let (app, state) = make_test_app().await;
        let data = setup_test_data(state.db(), false).await;

        let body = json!({ "subject": "", "description": "Something" });
        let response = app
            .oneshot(request("POST", "/api/tickets", Some(&data.requester_token()), Some(body)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = read_json(response).await;
        assert_eq!(json["success"], false);
        assert!(json["message"].as_str().unwrap().contains("Subject"));
    }

    #[tokio::test]
    async fn anonymous_callers_cannot_open_tickets() {
        let (app, _) = make_test_app().await;

        let body = json!({ "subject": "Hi", "description": "There" });
        let response = app.oneshot(request("POST", "/api/tickets", None, Some(body))).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(read_json(response).await["message"], "Authentication required");
    }

    #[tokio::test]
    async fn forged_tokens_are_rejected() {
        let (app, state) = make_test_app().await;
        let data = setup_test_data(state.db(), false).await;
        let token = format!("{}x", TestData::token(&data.requester));

        let body = json!({ "subject": "Hi", "description": "There" });
        let response = app
            .oneshot(request("POST", "/api/tickets", Some(&token), Some(body)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
