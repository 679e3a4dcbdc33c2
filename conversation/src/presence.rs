//! Presence channel and the presence-to-UI mapping.

use std::collections::BTreeSet;

use crate::channel::Channel;
use crate::error::{DecodeError, StoreError};
use crate::model::{Frame, PRESENCE_SYNC_EVENT, Participant, PresenceSnapshot, TicketId, UserId};
use crate::store::{TicketStore, validate_ticket_id};

/// Membership of one ticket's presence channel, tracked as `me`.
pub struct PresenceChannel {
    ticket_id: TicketId,
    me: Participant,
    channel: Channel,
}

impl PresenceChannel {
    pub async fn join(
        store: &dyn TicketStore,
        ticket_id: TicketId,
        me: Participant,
        capacity: usize,
    ) -> Result<Self, StoreError> {
        let ticket_id = validate_ticket_id(ticket_id)?;
        let channel = store.join_presence(ticket_id, &me, capacity).await?;
        tracing::debug!(ticket_id, user_id = me.id, role = %me.role, "presence joined");
        Ok(Self { ticket_id, me, channel })
    }

    pub fn ticket_id(&self) -> TicketId {
        self.ticket_id
    }

    /// Next full membership snapshot. Invalid frames are logged and skipped.
    pub async fn next(&mut self) -> Option<PresenceSnapshot> {
        loop {
            let frame = self.channel.recv().await?;
            match decode_snapshot(&frame) {
                Ok(snapshot) => return Some(snapshot),
                Err(e) => tracing::warn!(ticket_id = self.ticket_id, "dropping presence frame: {e}"),
            }
        }
    }

    /// Stops tracking and releases the connection.
    pub async fn close(self) {
        self.channel.close().await;
        tracing::debug!(ticket_id = self.ticket_id, user_id = self.me.id, "presence left");
    }
}

pub fn decode_snapshot(frame: &Frame) -> Result<PresenceSnapshot, DecodeError> {
    if frame.event != PRESENCE_SYNC_EVENT {
        return Err(DecodeError::UnexpectedEvent(frame.event.clone()));
    }
    Ok(serde_json::from_value(frame.payload.clone())?)
}

/// Whether `user_id` has at least one live connection in `snapshot`.
pub fn is_online(snapshot: &PresenceSnapshot, user_id: UserId) -> bool {
    snapshot.entries.iter().any(|e| e.user_id == user_id)
}

/// Distinct identities present, however many connections each holds.
pub fn online_users(snapshot: &PresenceSnapshot) -> BTreeSet<UserId> {
    snapshot.entries.iter().map(|e| e.user_id).collect()
}
