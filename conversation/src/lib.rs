//! Realtime ticket conversation and presence.
//!
//! A [`ConversationView`] keeps one ticket's chat thread and the
//! counterpart's online status in sync with the backing [`TicketStore`]:
//! history is loaded once, new rows arrive over a change feed and are merged
//! by a [`Reconciler`], and a presence channel reports who has the ticket
//! open.

pub mod channel;
pub mod config;
pub mod error;
pub mod feed;
pub mod memory;
pub mod model;
pub mod presence;
pub mod reconciler;
pub mod remote;
pub mod send;
pub mod store;
pub mod view;

pub use channel::{Channel, FrameSink};
pub use config::ClientConfig;
pub use error::{DecodeError, SendError, StoreError};
pub use feed::ChangeFeed;
pub use memory::MemoryStore;
pub use model::{Frame, Message, NewMessage, Participant, PresenceEntry, PresenceSnapshot, SenderRole, TicketId, UserId};
pub use presence::{PresenceChannel, is_online, online_users};
pub use reconciler::{Applied, Reconciler};
pub use remote::RemoteStore;
pub use send::{Composer, submit};
pub use store::TicketStore;
pub use view::{ConversationView, MountOptions, Update, ViewProps};
