use serde::Serialize;

use crate::ws::types::ClientTopic;

/// A server-pushed event: a stable wire name plus the topic it is published on.
pub trait Event: Serialize {
    const NAME: &'static str;
    fn topic(&self) -> ClientTopic;
}
