//! Client-side settings, read from `.env` and the environment.

use std::env;
use std::str::FromStr;

use crate::channel::DEFAULT_QUEUE_CAPACITY;
use crate::view::MountOptions;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base of the HTTP API, e.g. `http://127.0.0.1:3000`.
    pub api_url: String,
    /// Base of the WebSocket API, e.g. `ws://127.0.0.1:3000`.
    pub ws_url: String,
    pub queue_capacity: usize,
    /// Seconds between application-level pings on each socket.
    pub heartbeat_sec: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: "http://127.0.0.1:3000".into(),
            ws_url: "ws://127.0.0.1:3000".into(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            heartbeat_sec: 25,
        }
    }
}

fn parse_or<T: FromStr>(key: &str, default: T) -> T {
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "ignoring unparsable setting");
            default
        }),
        Err(_) => default,
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let defaults = Self::default();

        Self {
            api_url: env::var("HELPDESK_API_URL")
                .unwrap_or(defaults.api_url)
                .trim_end_matches('/')
                .to_owned(),
            ws_url: env::var("HELPDESK_WS_URL")
                .unwrap_or(defaults.ws_url)
                .trim_end_matches('/')
                .to_owned(),
            queue_capacity: parse_or("CONVERSATION_QUEUE_CAPACITY", defaults.queue_capacity).max(1),
            heartbeat_sec: parse_or("CONVERSATION_HEARTBEAT_SEC", defaults.heartbeat_sec).max(1),
        }
    }

    pub fn mount_options(&self) -> MountOptions {
        MountOptions {
            queue_capacity: self.queue_capacity,
        }
    }
}
