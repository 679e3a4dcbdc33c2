#[cfg(test)]
mod tests {
    use super::super::{read_json, request};
    use crate::helpers::{TestData, make_test_app, setup_test_data};
    use axum::http::StatusCode;
    use db::models::user::{self, UserRole};
    use tower::ServiceExt;

    #[tokio::test]
    async fn engineer_acquires_an_unassigned_ticket() {
        let (app, state) = make_test_app().await;
        let data = setup_test_data(state.db(), false).await;

        let uri = format!("/api/tickets/{}/assignee", data.ticket.id);
        let response = app
            .oneshot(request("PUT", &uri, Some(&data.engineer_token()), None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = read_json(response).await;
        assert_eq!(json["message"], "Ticket acquired");
        assert_eq!(json["data"]["assignee_id"], data.engineer.id);
        assert_eq!(json["data"]["status"], "open");
    }

    #[tokio::test]
    async fn second_engineer_gets_conflict() {
        let (app, state) = make_test_app().await;
        let data = setup_test_data(state.db(), true).await;
        let rival = user::Model::create(state.db(), "rita", "rita@test.com", UserRole::Engineer).await.unwrap();

        let uri = format!("/api/tickets/{}/assignee", data.ticket.id);
        let response = app
            .oneshot(request("PUT", &uri, Some(&TestData::token(&rival)), None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert_eq!(read_json(response).await["message"], "Ticket already acquired");
    }

    #[tokio::test]
    async fn plain_users_cannot_acquire() {
        let (app, state) = make_test_app().await;
        let data = setup_test_data(state.db(), false).await;

        let uri = format!("/api/tickets/{}/assignee", data.ticket.id);
        let response = app
            .oneshot(request("PUT", &uri, Some(&data.outsider_token()), None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(read_json(response).await["message"], "Engineer access required");
    }

    #[tokio::test]
    async fn unknown_ticket_is_not_found() {
        let (app, state) = make_test_app().await;
        let data = setup_test_data(state.db(), false).await;

        let response = app
            .oneshot(request("PUT", "/api/tickets/4242/assignee", Some(&data.engineer_token()), None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
