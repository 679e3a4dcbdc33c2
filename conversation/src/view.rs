//! A mounted ticket conversation.
//!
//! Mounting opens the change feed, loads history and joins presence. The
//! view then runs as a single event loop driven by [`ConversationView::next_update`].
//! Unmounting closes both channels; after that nothing can change the view.

use std::sync::Arc;

use crate::channel::DEFAULT_QUEUE_CAPACITY;
use crate::error::{SendError, StoreError};
use crate::feed::ChangeFeed;
use crate::model::{Message, Participant, PresenceSnapshot, TicketId};
use crate::presence::{PresenceChannel, is_online};
use crate::reconciler::{Applied, Reconciler};
use crate::send::Composer;
use crate::store::{TicketStore, validate_ticket_id};

/// Who is looking at which ticket, and with whom they talk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewProps {
    pub ticket_id: TicketId,
    pub me: Participant,
    /// `None` while nobody has picked up the ticket.
    pub counterpart: Option<Participant>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MountOptions {
    /// Depth of each channel's frame queue.
    pub queue_capacity: usize,
}

impl Default for MountOptions {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
        }
    }
}

/// One step of the view's event loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Update {
    Appended(Message),
    /// A message already shown was delivered again.
    Duplicate(i64),
    Presence { online: bool },
    /// The change feed ended; the view now only shows what it already has.
    FeedClosed,
    /// Presence ended; the counterpart is shown offline.
    PresenceClosed,
}

enum Incoming {
    Feed(Option<Message>),
    Presence(Option<PresenceSnapshot>),
}

pub struct ConversationView {
    store: Arc<dyn TicketStore>,
    props: ViewProps,
    feed: Option<ChangeFeed>,
    presence: Option<PresenceChannel>,
    reconciler: Reconciler,
    composer: Composer,
    counterpart_online: bool,
    revision: u64,
    mounted: bool,
}

impl ConversationView {
    /// Mounts the conversation of `props.ticket_id`.
    ///
    /// Only a failed history load fails the mount. A feed or presence channel
    /// that cannot be opened is logged and the view carries on without it.
    pub async fn mount(
        store: Arc<dyn TicketStore>,
        props: ViewProps,
        opts: MountOptions,
    ) -> Result<Self, StoreError> {
        let ticket_id = validate_ticket_id(props.ticket_id)?;

        // Opened before the history query so a row committed in between is
        // still delivered; the reconciler drops the overlap.
        let feed = match ChangeFeed::open(store.as_ref(), ticket_id, opts.queue_capacity).await {
            Ok(feed) => Some(feed),
            Err(e) => {
                tracing::warn!(ticket_id, "change feed unavailable, showing history only: {e}");
                None
            }
        };

        let history = match store.history(ticket_id).await {
            Ok(history) => history,
            Err(e) => {
                tracing::error!(ticket_id, "failed to load conversation history: {e}");
                if let Some(feed) = feed {
                    feed.close().await;
                }
                return Err(e);
            }
        };

        let presence = match PresenceChannel::join(store.as_ref(), ticket_id, props.me, opts.queue_capacity).await {
            Ok(presence) => Some(presence),
            Err(e) => {
                tracing::warn!(ticket_id, "presence unavailable, counterpart shown offline: {e}");
                None
            }
        };

        let mut reconciler = Reconciler::new(ticket_id);
        reconciler.seed(history);
        tracing::info!(ticket_id, messages = reconciler.len(), "conversation mounted");

        Ok(Self {
            store,
            props,
            feed,
            presence,
            reconciler,
            composer: Composer::new(),
            counterpart_online: false,
            revision: 0,
            mounted: true,
        })
    }

    /// Waits for the next frame on either channel and applies it.
    ///
    /// Returns `None` once unmounted or when both channels are gone.
    pub async fn next_update(&mut self) -> Option<Update> {
        loop {
            if !self.mounted {
                return None;
            }

            let incoming = match (self.feed.as_mut(), self.presence.as_mut()) {
                (None, None) => return None,
                (Some(feed), None) => Incoming::Feed(feed.next().await),
                (None, Some(presence)) => Incoming::Presence(presence.next().await),
                (Some(feed), Some(presence)) => tokio::select! {
                    message = feed.next() => Incoming::Feed(message),
                    snapshot = presence.next() => Incoming::Presence(snapshot),
                },
            };

            match incoming {
                Incoming::Feed(Some(message)) => match self.reconciler.apply(message.clone()) {
                    Applied::Appended => {
                        self.revision += 1;
                        return Some(Update::Appended(message));
                    }
                    Applied::Duplicate => return Some(Update::Duplicate(message.id)),
                    Applied::ForeignTicket => continue,
                },
                Incoming::Feed(None) => {
                    if let Some(feed) = self.feed.take() {
                        feed.close().await;
                    }
                    tracing::warn!(ticket_id = self.props.ticket_id, "change feed closed; resync to catch up");
                    return Some(Update::FeedClosed);
                }
                Incoming::Presence(Some(snapshot)) => {
                    let online = self
                        .props
                        .counterpart
                        .is_some_and(|c| is_online(&snapshot, c.id));
                    self.set_counterpart_online(online);
                    return Some(Update::Presence { online });
                }
                Incoming::Presence(None) => {
                    if let Some(presence) = self.presence.take() {
                        presence.close().await;
                    }
                    self.set_counterpart_online(false);
                    tracing::warn!(ticket_id = self.props.ticket_id, "presence channel closed");
                    return Some(Update::PresenceClosed);
                }
            }
        }
    }

    fn set_counterpart_online(&mut self, online: bool) {
        if self.counterpart_online != online {
            self.counterpart_online = online;
            self.revision += 1;
        }
    }

    pub fn props(&self) -> &ViewProps {
        &self.props
    }

    /// Messages in display order.
    pub fn messages(&self) -> &[Message] {
        self.reconciler.messages()
    }

    pub fn counterpart_online(&self) -> bool {
        self.counterpart_online
    }

    /// Bumped on every change visible to a renderer.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Whether new messages still arrive live.
    pub fn is_live(&self) -> bool {
        self.feed.is_some()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn draft(&self) -> &str {
        self.composer.draft()
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        self.composer.set_draft(text);
    }

    /// Sends the current draft. The message appears once the feed echoes it.
    pub async fn send(&mut self) -> Result<Message, SendError> {
        self.composer
            .send(self.store.as_ref(), self.props.ticket_id, &self.props.me)
            .await
    }

    /// Re-runs the history load and merges anything missed while the feed
    /// was down. Returns how many messages were new.
    pub async fn resync(&mut self) -> Result<usize, StoreError> {
        if !self.mounted {
            return Ok(0);
        }
        let history = self.store.history(self.props.ticket_id).await?;
        let added = self.reconciler.merge(history);
        if added > 0 {
            self.revision += 1;
        }
        tracing::info!(ticket_id = self.props.ticket_id, added, "conversation resynced");
        Ok(added)
    }

    /// Closes both channels and waits until they are released.
    pub async fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        self.mounted = false;
        if let Some(feed) = self.feed.take() {
            feed.close().await;
        }
        if let Some(presence) = self.presence.take() {
            presence.close().await;
        }
        tracing::info!(ticket_id = self.props.ticket_id, "conversation unmounted");
    }
}
