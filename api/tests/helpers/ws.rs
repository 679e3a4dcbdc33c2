use axum::{
    body::Body,
    http::{Request, Response},
};
use futures_util::StreamExt;
use serde_json::Value;
use std::convert::Infallible;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async,
    tungstenite::{Message, client::IntoClientRequest},
};
use tower::make::Shared;
use tower::util::BoxCloneService;
use url::Url;

pub type TestSocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Spawns the Axum app on a random local port
pub async fn spawn_server(app: BoxCloneService<Request<Body>, Response<Body>, Infallible>) -> std::net::SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let service = Shared::new(app);

    tokio::spawn(async move {
        axum::serve(listener, service).await.unwrap();
    });

    tokio::time::sleep(Duration::from_millis(100)).await;
    addr
}

/// Connects to a WebSocket route at `/ws/{path}?token=...`
pub async fn connect_ws(
    addr: &str,
    path: &str,
    token: &str,
) -> Result<(TestSocket, axum::http::Response<Option<Vec<u8>>>), tokio_tungstenite::tungstenite::Error> {
    let url = Url::parse(&format!("ws://{addr}/ws/{path}?token={token}")).unwrap();

    let req = url.to_string().into_client_request().unwrap();
    let connected = connect_async(req).await?;
    // The server subscribes after the upgrade completes.
    tokio::time::sleep(Duration::from_millis(50)).await;
    Ok(connected)
}

/// Connects to `/ws/tickets/{ticket_id}` and consumes the subscription frame.
pub async fn connect_feed(addr: &str, ticket_id: i64, token: &str) -> TestSocket {
    let (mut ws, _) = connect_ws(addr, &format!("tickets/{ticket_id}"), token).await.unwrap();
    let ack = next_event(&mut ws, Duration::from_secs(2)).await.expect("subscription frame");
    assert_eq!(ack["event"], "ticket.subscribed");
    assert_eq!(ack["topic"], format!("tickets:{ticket_id}"));
    ws
}

/// Next JSON text frame, skipping control frames. `None` on timeout or close.
pub async fn next_event(ws: &mut TestSocket, wait: Duration) -> Option<Value> {
    let deadline = tokio::time::Instant::now() + wait;
    loop {
        let frame = tokio::time::timeout_at(deadline, ws.next()).await.ok()??;
        match frame.ok()? {
            Message::Text(text) => return serde_json::from_str(text.as_str()).ok(),
            Message::Close(_) => return None,
            _ => continue,
        }
    }
}
