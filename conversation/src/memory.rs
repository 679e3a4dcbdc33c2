//! In-process [`TicketStore`] with deterministic timing and fault hooks.
//!
//! Mirrors the server's semantics: append-only rows with non-decreasing
//! timestamps, one broadcast feed per ticket, and a per-connection presence
//! registry that rebroadcasts the full membership on every change.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::{Mutex, broadcast};

use crate::channel::{Channel, FrameSink};
use crate::error::StoreError;
use crate::model::{
    Frame, MESSAGE_CREATED_EVENT, Message, NewMessage, PRESENCE_SYNC_EVENT, Participant, PresenceEntry,
    PresenceSnapshot, TicketId,
};
use crate::store::{TicketStore, validate_ticket_id};

const FANOUT_CAPACITY: usize = 256;

type ConnectionId = u64;

#[derive(Default)]
struct PresenceTopic {
    entries: BTreeMap<ConnectionId, PresenceEntry>,
}

#[derive(Default)]
struct State {
    messages: Vec<Message>,
    last_created_at: Option<DateTime<Utc>>,
    feeds: HashMap<TicketId, broadcast::Sender<Frame>>,
    presence_feeds: HashMap<TicketId, broadcast::Sender<Frame>>,
    presence: HashMap<TicketId, PresenceTopic>,
    next_connection: ConnectionId,
}

impl State {
    fn feed(&mut self, ticket_id: TicketId) -> broadcast::Sender<Frame> {
        self.feeds
            .entry(ticket_id)
            .or_insert_with(|| broadcast::channel(FANOUT_CAPACITY).0)
            .clone()
    }

    fn presence_feed(&mut self, ticket_id: TicketId) -> broadcast::Sender<Frame> {
        self.presence_feeds
            .entry(ticket_id)
            .or_insert_with(|| broadcast::channel(FANOUT_CAPACITY).0)
            .clone()
    }

    fn snapshot(&self, ticket_id: TicketId) -> PresenceSnapshot {
        PresenceSnapshot {
            entries: self
                .presence
                .get(&ticket_id)
                .map(|t| t.entries.values().cloned().collect())
                .unwrap_or_default(),
        }
    }

    fn broadcast_presence(&mut self, ticket_id: TicketId) {
        let snapshot = self.snapshot(ticket_id);
        let frame = Frame::new(
            PRESENCE_SYNC_EVENT,
            presence_topic(ticket_id),
            serde_json::to_value(snapshot).unwrap_or_default(),
        );
        let _ = self.presence_feed(ticket_id).send(frame);
    }

    /// Next creation time; never earlier than the previous one.
    fn stamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let stamped = match self.last_created_at {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_created_at = Some(stamped);
        stamped
    }
}

#[derive(Default)]
struct Faults {
    feed_unavailable: AtomicBool,
    presence_unavailable: AtomicBool,
    history_unavailable: AtomicBool,
    failing_inserts: AtomicUsize,
}

/// Cheap to clone; clones share the same store.
#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
    faults: Arc<Faults>,
    insert_calls: Arc<AtomicUsize>,
    open_channels: Arc<AtomicUsize>,
}

fn feed_topic(ticket_id: TicketId) -> String {
    format!("tickets:{ticket_id}")
}

fn presence_topic(ticket_id: TicketId) -> String {
    format!("tickets:{ticket_id}:presence")
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of insert attempts that reached the store, failed or not.
    pub fn insert_calls(&self) -> usize {
        self.insert_calls.load(Ordering::SeqCst)
    }

    /// Change-feed and presence channels whose pump is still running.
    pub fn open_channels(&self) -> usize {
        self.open_channels.load(Ordering::SeqCst)
    }

    pub fn fail_next_inserts(&self, count: usize) {
        self.faults.failing_inserts.store(count, Ordering::SeqCst);
    }

    pub fn set_feed_unavailable(&self, unavailable: bool) {
        self.faults.feed_unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn set_presence_unavailable(&self, unavailable: bool) {
        self.faults.presence_unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn set_history_unavailable(&self, unavailable: bool) {
        self.faults.history_unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Commits a row without broadcasting it, as if its insert event were lost.
    pub async fn insert_silently(&self, new: &NewMessage) -> Result<Message, StoreError> {
        validate_ticket_id(new.ticket_id)?;
        let mut state = self.state.lock().await;
        Ok(Self::commit(&mut state, new))
    }

    /// Pushes a raw frame onto a ticket's change feed. Returns how many
    /// subscribers received it.
    pub async fn inject_feed_frame(&self, ticket_id: TicketId, frame: Frame) -> usize {
        let tx = self.state.lock().await.feed(ticket_id);
        tx.send(frame).unwrap_or(0)
    }

    /// Redelivers an already-committed row (duplicate or late delivery).
    pub async fn redeliver(&self, message: &Message) -> usize {
        let frame = Frame::new(
            MESSAGE_CREATED_EVENT,
            feed_topic(message.ticket_id),
            serde_json::to_value(message).unwrap_or_default(),
        );
        self.inject_feed_frame(message.ticket_id, frame).await
    }

    /// Ends every open change feed of a ticket, as a transport drop would.
    pub async fn drop_feed(&self, ticket_id: TicketId) {
        self.state.lock().await.feeds.remove(&ticket_id);
    }

    /// Current raw membership of a ticket's presence channel.
    pub async fn presence_of(&self, ticket_id: TicketId) -> PresenceSnapshot {
        self.state.lock().await.snapshot(ticket_id)
    }

    fn commit(state: &mut State, new: &NewMessage) -> Message {
        let message = Message {
            id: state.messages.len() as i64 + 1,
            ticket_id: new.ticket_id,
            sender_id: new.sender_id,
            sender_role: new.sender_role,
            body: new.body.clone(),
            created_at: state.stamp(),
        };
        state.messages.push(message.clone());
        message
    }

    fn spawn_pump(&self, capacity: usize, mut rx: broadcast::Receiver<Frame>, on_exit: Option<(TicketId, ConnectionId)>) -> Channel {
        let open = self.open_channels.clone();
        let state = self.state.clone();
        open.fetch_add(1, Ordering::SeqCst);

        Channel::spawn(capacity, move |sink: FrameSink| async move {
            loop {
                tokio::select! {
                    _ = sink.cancelled() => break,
                    received = rx.recv() => match received {
                        Ok(frame) => {
                            if !sink.deliver(frame).await {
                                break;
                            }
                        }
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            tracing::warn!(skipped, "memory store subscriber lagged; oldest frames dropped");
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    }
                }
            }

            if let Some((ticket_id, connection)) = on_exit {
                let mut state = state.lock().await;
                let removed = state
                    .presence
                    .get_mut(&ticket_id)
                    .and_then(|t| t.entries.remove(&connection))
                    .is_some();
                if removed {
                    state.broadcast_presence(ticket_id);
                }
            }
            open.fetch_sub(1, Ordering::SeqCst);
        })
    }
}

#[async_trait]
impl TicketStore for MemoryStore {
    async fn history(&self, ticket_id: TicketId) -> Result<Vec<Message>, StoreError> {
        validate_ticket_id(ticket_id)?;
        if self.faults.history_unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("history query failed".into()));
        }

        let state = self.state.lock().await;
        let mut rows: Vec<Message> = state
            .messages
            .iter()
            .filter(|m| m.ticket_id == ticket_id)
            .cloned()
            .collect();
        rows.sort_by_key(Message::display_key);
        Ok(rows)
    }

    async fn insert(&self, new: &NewMessage) -> Result<Message, StoreError> {
        validate_ticket_id(new.ticket_id)?;
        self.insert_calls.fetch_add(1, Ordering::SeqCst);

        let failing = self
            .faults
            .failing_inserts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        if failing.is_ok() {
            return Err(StoreError::Unavailable("insert failed".into()));
        }

        let mut state = self.state.lock().await;
        let message = Self::commit(&mut state, new);
        let frame = Frame::new(
            MESSAGE_CREATED_EVENT,
            feed_topic(new.ticket_id),
            serde_json::to_value(&message).map_err(|e| StoreError::Decode(e.to_string()))?,
        );
        let _ = state.feed(new.ticket_id).send(frame);
        Ok(message)
    }

    async fn subscribe_inserts(&self, ticket_id: TicketId, capacity: usize) -> Result<Channel, StoreError> {
        validate_ticket_id(ticket_id)?;
        if self.faults.feed_unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("change feed refused".into()));
        }

        let rx = self.state.lock().await.feed(ticket_id).subscribe();
        Ok(self.spawn_pump(capacity, rx, None))
    }

    async fn join_presence(
        &self,
        ticket_id: TicketId,
        me: &Participant,
        capacity: usize,
    ) -> Result<Channel, StoreError> {
        validate_ticket_id(ticket_id)?;
        if self.faults.presence_unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("presence refused".into()));
        }

        let mut state = self.state.lock().await;
        let rx = state.presence_feed(ticket_id).subscribe();
        state.next_connection += 1;
        let connection = state.next_connection;
        state.presence.entry(ticket_id).or_default().entries.insert(
            connection,
            PresenceEntry {
                user_id: me.id,
                role: me.role.to_string(),
            },
        );
        state.broadcast_presence(ticket_id);
        drop(state);

        Ok(self.spawn_pump(capacity, rx, Some((ticket_id, connection))))
    }
}
