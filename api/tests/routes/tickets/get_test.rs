#[cfg(test)]
mod tests {
    use super::super::{read_json, request};
    use crate::helpers::{make_test_app, setup_test_data};
    use api::auth::generate_jwt;
    use axum::http::StatusCode;
    use db::models::user::{self, UserRole};
    use tower::ServiceExt;

    #[tokio::test]
    async fn requester_sees_role_and_missing_counterpart() {
        let (app, state) = make_test_app().await;
        let data = setup_test_data(state.db(), false).await;

        let uri = format!("/api/tickets/{}", data.ticket.id);
        let response = app
            .oneshot(request("GET", &uri, Some(&data.requester_token()), None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = read_json(response).await;
        assert_eq!(json["data"]["id"], data.ticket.id);
        assert_eq!(json["data"]["role"], "requester");
        assert!(json["data"]["counterpart_id"].is_null());
    }

    #[tokio::test]
    async fn assignee_sees_requester_as_counterpart() {
        let (app, state) = make_test_app().await;
        let data = setup_test_data(state.db(), true).await;

        let uri = format!("/api/tickets/{}", data.ticket.id);
        let response = app
            .oneshot(request("GET", &uri, Some(&data.engineer_token()), None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = read_json(response).await;
        assert_eq!(json["data"]["role"], "responder");
        assert_eq!(json["data"]["counterpart_id"], data.requester.id);
        assert_eq!(json["data"]["status"], "open");
    }

    #[tokio::test]
    async fn admins_join_as_responders() {
        let (app, state) = make_test_app().await;
        let data = setup_test_data(state.db(), true).await;
        let admin = user::Model::create(state.db(), "ada", "ada@test.com", UserRole::Admin).await.unwrap();
        let (token, _) = generate_jwt(admin.id, admin.role).unwrap();

        let uri = format!("/api/tickets/{}", data.ticket.id);
        let response = app.oneshot(request("GET", &uri, Some(&token), None)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(read_json(response).await["data"]["role"], "responder");
    }

    #[tokio::test]
    async fn bystanders_are_forbidden() {
        let (app, state) = make_test_app().await;
        let data = setup_test_data(state.db(), true).await;

        let uri = format!("/api/tickets/{}", data.ticket.id);
        let response = app
            .oneshot(request("GET", &uri, Some(&data.outsider_token()), None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(read_json(response).await["message"], "Not a participant of this ticket");
    }

    #[tokio::test]
    async fn unknown_and_invalid_ids() {
        let (app, state) = make_test_app().await;
        let data = setup_test_data(state.db(), false).await;
        let token = data.requester_token();

        let response = app
            .clone()
            .oneshot(request("GET", "/api/tickets/9999", Some(&token), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app
            .oneshot(request("GET", "/api/tickets/abc", Some(&token), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
