//! Publishing typed events on the topic they name.

use util::ws::{EventEnvelope, WebSocketManager};

use super::event::Event;

/// Broadcasts `ev` on its topic and returns how many sockets were subscribed
/// when it went out.
pub async fn publish<E: Event>(ws: &WebSocketManager, ev: &E) -> usize {
    let topic = ev.topic().path();
    let Some(json) = EventEnvelope::new(&topic, E::NAME, ev).to_json() else {
        return 0;
    };

    let listeners = ws.subscriber_count(&topic).await;
    ws.broadcast(&topic, json).await;
    tracing::debug!(event = E::NAME, %topic, listeners, "published");
    listeners
}
