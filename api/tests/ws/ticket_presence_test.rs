#[cfg(test)]
mod tests {
    use crate::helpers::{connect_ws, make_test_app, next_event, setup_test_data, spawn_server};
    use futures_util::SinkExt;
    use serde_json::{Value, json};
    use std::time::Duration;
    use tokio_tungstenite::tungstenite::Message;

    const WAIT: Duration = Duration::from_secs(2);

    fn user_ids(event: &Value) -> Vec<i64> {
        let mut ids: Vec<i64> = event["payload"]["entries"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["user_id"].as_i64().unwrap())
            .collect();
        ids.sort();
        ids
    }

    #[tokio::test]
    async fn join_and_leave_broadcast_full_snapshots() {
        let (app, state) = make_test_app().await;
        let data = setup_test_data(state.db(), true).await;
        let addr = spawn_server(app).await;
        let path = format!("tickets/{}/presence", data.ticket.id);

        let (mut requester_ws, _) = connect_ws(&addr.to_string(), &path, &data.requester_token()).await.unwrap();
        let joined = next_event(&mut requester_ws, WAIT).await.expect("own snapshot");
        assert_eq!(joined["event"], "presence.sync");
        assert_eq!(joined["topic"], format!("tickets:{}:presence", data.ticket.id));
        assert_eq!(user_ids(&joined), vec![data.requester.id]);
        assert_eq!(joined["payload"]["entries"][0]["role"], "requester");

        let (mut engineer_ws, _) = connect_ws(&addr.to_string(), &path, &data.engineer_token()).await.unwrap();
        let both = next_event(&mut requester_ws, WAIT).await.expect("engineer joined");
        let mut expected = vec![data.requester.id, data.engineer.id];
        expected.sort();
        assert_eq!(user_ids(&both), expected);

        engineer_ws.close(None).await.unwrap();
        let left = next_event(&mut requester_ws, WAIT).await.expect("engineer left");
        assert_eq!(user_ids(&left), vec![data.requester.id]);

        requester_ws.close(None).await.unwrap();
    }

    #[tokio::test]
    async fn each_tab_is_its_own_entry() {
        let (app, state) = make_test_app().await;
        let data = setup_test_data(state.db(), true).await;
        let addr = spawn_server(app).await;
        let path = format!("tickets/{}/presence", data.ticket.id);
        let topic = format!("tickets:{}:presence", data.ticket.id);

        let (mut tab1, _) = connect_ws(&addr.to_string(), &path, &data.engineer_token()).await.unwrap();
        let (mut tab2, _) = connect_ws(&addr.to_string(), &path, &data.engineer_token()).await.unwrap();
        assert_eq!(state.ws().presence_state(&topic).await.len(), 2);

        tab2.close(None).await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(state.ws().is_user_present_on(&topic, data.engineer.id).await);

        tab1.close(None).await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!state.ws().is_user_present_on(&topic, data.engineer.id).await);
        assert!(state.ws().presence_state(&topic).await.is_empty());
    }

    #[tokio::test]
    async fn sync_request_replies_privately() {
        let (app, state) = make_test_app().await;
        let data = setup_test_data(state.db(), true).await;
        let addr = spawn_server(app).await;
        let path = format!("tickets/{}/presence", data.ticket.id);

        let (mut requester_ws, _) = connect_ws(&addr.to_string(), &path, &data.requester_token()).await.unwrap();
        let (mut engineer_ws, _) = connect_ws(&addr.to_string(), &path, &data.engineer_token()).await.unwrap();
        // Drain join snapshots.
        while next_event(&mut requester_ws, Duration::from_millis(200)).await.is_some() {}
        while next_event(&mut engineer_ws, Duration::from_millis(200)).await.is_some() {}

        engineer_ws
            .send(Message::Text(json!({ "type": "sync" }).to_string().into()))
            .await
            .unwrap();

        let reply = next_event(&mut engineer_ws, WAIT).await.expect("sync reply");
        assert_eq!(reply["event"], "presence.sync");
        assert_eq!(user_ids(&reply).len(), 2);
        assert!(next_event(&mut requester_ws, Duration::from_millis(200)).await.is_none());

        requester_ws.close(None).await.unwrap();
        engineer_ws.close(None).await.unwrap();
    }
}
