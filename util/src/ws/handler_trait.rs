use super::runtime::WsContext;
use serde::de::DeserializeOwned;
use std::future::Future;

/// Feature-specific behaviour plugged into [`serve_topic`](super::serve::serve_topic).
pub trait WsHandler: Send + Sync + 'static {
    /// Client frames this handler understands (tagged enum recommended).
    /// Frames that fail to parse are logged and dropped by the server loop.
    type In: DeserializeOwned + Send;

    /// Called once the socket is subscribed and, if applicable, tracked.
    fn on_open(&self, ctx: &WsContext) -> impl Future<Output = ()> + Send {
        async move {
            let _ = ctx;
        }
    }

    /// Called for every parsed text frame.
    fn on_message(&self, ctx: &WsContext, msg: Self::In) -> impl Future<Output = ()> + Send;

    /// Called when the socket is closing; presence is untracked *after* this.
    fn on_close(&self, ctx: &WsContext) -> impl Future<Output = ()> + Send {
        async move {
            let _ = ctx;
        }
    }
}
