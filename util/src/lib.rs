//! Shared server infrastructure: configuration, application state and the
//! topic/presence WebSocket layer.

pub mod config;
pub mod state;
pub mod ws;
