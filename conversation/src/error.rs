use thiserror::Error;

use crate::model::TicketId;

/// Failures talking to the backing store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("invalid ticket id {0}")]
    InvalidTicket(TicketId),

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("could not decode store response: {0}")]
    Decode(String),
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            StoreError::Decode(err.to_string())
        } else {
            StoreError::Unavailable(err.to_string())
        }
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for StoreError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        use tokio_tungstenite::tungstenite::Error as WsError;
        match err {
            WsError::Http(resp) => StoreError::Rejected {
                status: resp.status().as_u16(),
                message: "websocket upgrade refused".into(),
            },
            other => StoreError::Unavailable(other.to_string()),
        }
    }
}

/// Failures of the message send path.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SendError {
    #[error("message body is empty")]
    EmptyBody,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// A frame that failed validation at the subscription boundary.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("unexpected event `{0}`")]
    UnexpectedEvent(String),

    #[error("malformed payload: {0}")]
    Malformed(String),

    #[error("message for ticket {got} on the feed of ticket {expected}")]
    ForeignTicket { expected: TicketId, got: TicketId },
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        DecodeError::Malformed(err.to_string())
    }
}
