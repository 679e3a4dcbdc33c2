//! Topic-based broadcast manager with a per-topic presence registry.
//!
//! Uses Tokio broadcast channels per topic. Presence is tracked per
//! connection, so one identity with several open sockets (tabs) owns several
//! entries; every track/untrack rebroadcasts the full entry list on the topic.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{RwLock, broadcast};

/// Event name of a full presence snapshot.
pub const PRESENCE_SYNC_EVENT: &str = "presence.sync";

type Topic = String;

type Sender = broadcast::Sender<String>;

type Receiver = broadcast::Receiver<String>;

/// Identifies one tracked socket. Unique for the lifetime of a manager.
pub type ConnectionId = u64;

/// What a connection announces about itself on a presence topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceEntry {
    pub user_id: i64,
    pub role: String,
}

/// Payload of a `presence.sync` event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresenceState {
    pub entries: Vec<PresenceEntry>,
}

/// Manages broadcast channels per topic and who is present on them.
///
/// - Lazily creates broadcast channels per topic on first subscription
/// - Removes topics when their subscriber count drops to zero after sending
/// - A slow subscriber loses the oldest frames (broadcast lag), never blocks senders
#[derive(Clone)]
pub struct WebSocketManager {
    /// Map of topics to broadcast senders.
    pub inner: Arc<RwLock<HashMap<Topic, Sender>>>,
    /// topic -> (connection -> entry)
    presence: Arc<RwLock<HashMap<Topic, BTreeMap<ConnectionId, PresenceEntry>>>>,
    next_connection: Arc<AtomicU64>,
    capacity: usize,
}

impl Default for WebSocketManager {
    fn default() -> Self {
        Self::with_capacity(100)
    }
}

impl WebSocketManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a manager whose topic channels buffer `capacity` frames.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Arc::default(),
            presence: Arc::default(),
            next_connection: Arc::new(AtomicU64::new(1)),
            capacity: capacity.max(1),
        }
    }

    /// Subscribes to the given topic, creating it if necessary.
    pub async fn subscribe(&self, topic: &str) -> Receiver {
        let mut map = self.inner.write().await;
        map.entry(topic.to_string())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    /// Broadcasts a message to all subscribers of `topic`.
    ///
    /// If the topic does not exist, it's a no-op.
    /// If the topic has zero subscribers after sending, it is removed.
    pub async fn broadcast<T: Into<String>>(&self, topic: &str, msg: T) {
        let mut map = self.inner.write().await;
        if let Some(sender) = map.get(topic) {
            let _ = sender.send(msg.into());
            if sender.receiver_count() == 0 {
                tracing::info!("Removing topic '{topic}' due to no subscribers.");
                map.remove(topic);
            }
        }
    }

    /// Number of live receivers on `topic` (0 if the topic does not exist).
    pub async fn subscriber_count(&self, topic: &str) -> usize {
        self.inner
            .read()
            .await
            .get(topic)
            .map(|s| s.receiver_count())
            .unwrap_or(0)
    }

    // -------------------- Presence API --------------------

    /// Tracks one connection on `topic` and broadcasts the new snapshot.
    ///
    /// Subscribe to the topic *before* tracking so the caller's own socket
    /// receives the snapshot that includes it.
    pub async fn track(&self, topic: &str, entry: PresenceEntry) -> ConnectionId {
        let id = self.next_connection.fetch_add(1, Ordering::Relaxed);
        {
            let mut p = self.presence.write().await;
            p.entry(topic.to_string()).or_default().insert(id, entry);
        }
        self.broadcast_presence(topic).await;
        id
    }

    /// Drops one connection from `topic` and broadcasts the new snapshot.
    ///
    /// Returns `false` if the connection was not tracked there.
    pub async fn untrack(&self, topic: &str, connection: ConnectionId) -> bool {
        let removed = {
            let mut p = self.presence.write().await;
            let removed = match p.get_mut(topic) {
                Some(conns) => conns.remove(&connection).is_some(),
                None => false,
            };
            if p.get(topic).is_some_and(|conns| conns.is_empty()) {
                p.remove(topic);
            }
            removed
        };
        if removed {
            self.broadcast_presence(topic).await;
        }
        removed
    }

    /// Every tracked entry on `topic`, one per connection, in join order.
    pub async fn presence_state(&self, topic: &str) -> Vec<PresenceEntry> {
        let p = self.presence.read().await;
        p.get(topic)
            .map(|conns| conns.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Returns `true` if `user_id` has at least one tracked connection on `topic`.
    pub async fn is_user_present_on(&self, topic: &str, user_id: i64) -> bool {
        let p = self.presence.read().await;
        p.get(topic)
            .is_some_and(|conns| conns.values().any(|e| e.user_id == user_id))
    }

    async fn broadcast_presence(&self, topic: &str) {
        let state = PresenceState {
            entries: self.presence_state(topic).await,
        };
        super::emit(self, topic, PRESENCE_SYNC_EVENT, &state).await;
    }
}
