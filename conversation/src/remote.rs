//! [`TicketStore`] backed by the help-desk API server.
//!
//! History and inserts go over HTTP; the change feed and presence each hold
//! one WebSocket with a periodic application-level ping.

use async_trait::async_trait;
use futures::{SinkExt, StreamExt};
use reqwest::StatusCode;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::http::header::AUTHORIZATION;
use tokio_tungstenite::tungstenite::protocol::Message as WsMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use url::Url;

use crate::channel::{Channel, FrameSink};
use crate::config::ClientConfig;
use crate::error::{DecodeError, StoreError};
use crate::model::{Frame, Message, NewMessage, Participant, SUBSCRIBED_EVENT, TicketId};
use crate::store::{TicketStore, validate_ticket_id};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

const PING: &str = r#"{"type":"ping"}"#;

/// How long a new change-feed socket may take to confirm its subscription.
const SUBSCRIBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Response wrapper used by every API endpoint.
#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    success: bool,
    data: Option<T>,
    #[serde(default)]
    message: String,
}

/// Event envelope used on every WebSocket topic.
#[derive(Debug, Deserialize)]
struct EventEnvelope {
    #[serde(rename = "type")]
    kind: String,
    #[serde(flatten)]
    frame: Frame,
}

/// Parses one text frame from a topic socket.
///
/// Returns `Ok(None)` for heartbeat replies.
fn parse_event(raw: &str) -> Result<Option<Frame>, DecodeError> {
    let envelope: EventEnvelope = serde_json::from_str(raw)?;
    if envelope.kind != "event" {
        return Err(DecodeError::UnexpectedEvent(envelope.kind));
    }
    if envelope.frame.event == "pong" {
        return Ok(None);
    }
    Ok(Some(envelope.frame))
}

#[derive(Clone)]
pub struct RemoteStore {
    http: reqwest::Client,
    api_url: String,
    ws_url: String,
    token: String,
    heartbeat: Duration,
}

impl RemoteStore {
    /// `token` is the caller's bearer JWT.
    pub fn new(config: &ClientConfig, token: impl Into<String>) -> Result<Self, StoreError> {
        for base in [&config.api_url, &config.ws_url] {
            Url::parse(base).map_err(|e| StoreError::Unavailable(format!("invalid base url `{base}`: {e}")))?;
        }

        Ok(Self {
            http: reqwest::Client::new(),
            api_url: config.api_url.trim_end_matches('/').to_owned(),
            ws_url: config.ws_url.trim_end_matches('/').to_owned(),
            token: token.into(),
            heartbeat: Duration::from_secs(config.heartbeat_sec.max(1)),
        })
    }

    fn messages_url(&self, ticket_id: TicketId) -> String {
        format!("{}/api/tickets/{ticket_id}/messages", self.api_url)
    }

    async fn read_envelope<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, StoreError> {
        let status = response.status();
        let envelope: ApiEnvelope<T> = match response.json().await {
            Ok(envelope) => envelope,
            Err(e) if status.is_success() => return Err(StoreError::Decode(e.to_string())),
            Err(_) => {
                return Err(StoreError::Rejected {
                    status: status.as_u16(),
                    message: status.canonical_reason().unwrap_or("error").to_owned(),
                });
            }
        };

        if !status.is_success() || !envelope.success {
            return Err(StoreError::Rejected {
                status: status.as_u16(),
                message: envelope.message,
            });
        }
        envelope
            .data
            .ok_or_else(|| StoreError::Decode("response carried no data".into()))
    }

    async fn connect(&self, path: &str) -> Result<Socket, StoreError> {
        let url = format!("{}/ws/{path}", self.ws_url);
        let mut request = url
            .as_str()
            .into_client_request()
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", self.token))
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        request.headers_mut().insert(AUTHORIZATION, bearer);

        let (socket, _) = connect_async(request).await?;
        tracing::debug!(%url, "websocket connected");
        Ok(socket)
    }

    fn spawn_pump(&self, socket: Socket, capacity: usize, early: Vec<Frame>) -> Channel {
        let heartbeat = self.heartbeat;
        Channel::spawn(capacity, move |sink| pump(socket, sink, heartbeat, early))
    }
}

/// Reads until the server confirms the change-feed subscription.
///
/// Events that overtake the confirmation are returned so the pump can queue
/// them first.
async fn await_subscribed(socket: &mut Socket) -> Result<Vec<Frame>, StoreError> {
    let mut early = Vec::new();
    loop {
        let incoming = tokio::time::timeout(SUBSCRIBE_TIMEOUT, socket.next())
            .await
            .map_err(|_| StoreError::Unavailable("change feed subscription was not confirmed".into()))?;

        match incoming {
            Some(Ok(WsMessage::Text(text))) => match parse_event(text.as_str()) {
                Ok(Some(frame)) if frame.event == SUBSCRIBED_EVENT => return Ok(early),
                Ok(Some(frame)) => early.push(frame),
                Ok(None) => {}
                Err(e) => tracing::warn!("ignoring undecodable frame: {e}"),
            },
            Some(Ok(WsMessage::Ping(payload))) => socket.send(WsMessage::Pong(payload)).await?,
            Some(Ok(WsMessage::Close(_))) | None => {
                return Err(StoreError::Unavailable("change feed closed before it was confirmed".into()));
            }
            Some(Ok(_)) => {}
            Some(Err(e)) => return Err(e.into()),
        }
    }
}

/// Moves topic events from `socket` into the channel queue until either side
/// goes away. `early` frames are queued before anything read from the socket.
async fn pump(socket: Socket, sink: FrameSink, heartbeat: Duration, early: Vec<Frame>) {
    for frame in early {
        if !sink.deliver(frame).await {
            return;
        }
    }

    let (mut write, mut read) = socket.split();
    let mut ticker = tokio::time::interval(heartbeat);
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = sink.cancelled() => {
                let _ = write.send(WsMessage::Close(None)).await;
                break;
            }
            _ = ticker.tick() => {
                if write.send(WsMessage::Text(PING.into())).await.is_err() {
                    break;
                }
            }
            incoming = read.next() => match incoming {
                Some(Ok(WsMessage::Text(text))) => match parse_event(text.as_str()) {
                    Ok(Some(frame)) => {
                        if !sink.deliver(frame).await {
                            break;
                        }
                    }
                    Ok(None) => {}
                    Err(e) => tracing::warn!("ignoring undecodable frame: {e}"),
                },
                Some(Ok(WsMessage::Ping(payload))) => {
                    if write.send(WsMessage::Pong(payload)).await.is_err() {
                        break;
                    }
                }
                Some(Ok(WsMessage::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::warn!("websocket read failed: {e}");
                    break;
                }
            },
        }
    }
    tracing::debug!("websocket pump stopped");
}

#[async_trait]
impl TicketStore for RemoteStore {
    async fn history(&self, ticket_id: TicketId) -> Result<Vec<Message>, StoreError> {
        validate_ticket_id(ticket_id)?;
        let response = self
            .http
            .get(self.messages_url(ticket_id))
            .bearer_auth(&self.token)
            .send()
            .await?;
        Self::read_envelope(response).await
    }

    async fn insert(&self, message: &NewMessage) -> Result<Message, StoreError> {
        validate_ticket_id(message.ticket_id)?;
        let response = self
            .http
            .post(self.messages_url(message.ticket_id))
            .bearer_auth(&self.token)
            .json(&serde_json::json!({ "body": message.body }))
            .send()
            .await?;

        if response.status() == StatusCode::FORBIDDEN {
            tracing::warn!(ticket_id = message.ticket_id, "not a participant of this ticket");
        }
        Self::read_envelope(response).await
    }

    async fn subscribe_inserts(&self, ticket_id: TicketId, capacity: usize) -> Result<Channel, StoreError> {
        validate_ticket_id(ticket_id)?;
        let mut socket = self.connect(&format!("tickets/{ticket_id}")).await?;
        let early = await_subscribed(&mut socket).await?;
        tracing::debug!(ticket_id, "remote change feed confirmed");
        Ok(self.spawn_pump(socket, capacity, early))
    }

    /// The server tracks the identity behind the token; `me` must be that
    /// identity.
    async fn join_presence(
        &self,
        ticket_id: TicketId,
        me: &Participant,
        capacity: usize,
    ) -> Result<Channel, StoreError> {
        validate_ticket_id(ticket_id)?;
        let socket = self.connect(&format!("tickets/{ticket_id}/presence")).await?;
        tracing::debug!(ticket_id, user_id = me.id, "joined remote presence");
        Ok(self.spawn_pump(socket, capacity, Vec::new()))
    }
}
