//! Application state container shared across Axum route handlers.
//!
//! Holds the database connection and the topic manager that carries the
//! change feed and presence traffic.

use crate::ws::WebSocketManager;
use sea_orm::DatabaseConnection;

/// Central application state shared across the server.
#[derive(Clone)]
pub struct AppState {
    db: DatabaseConnection,
    ws: WebSocketManager,
}

impl AppState {
    /// Creates a new `AppState` from a connection and a topic manager.
    pub fn new(db: DatabaseConnection, ws: WebSocketManager) -> Self {
        Self { db, ws }
    }

    /// Shared reference to the database connection.
    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Shared reference to the topic manager.
    pub fn ws(&self) -> &WebSocketManager {
        &self.ws
    }

    /// Cloned connection, for spawned tasks that need ownership.
    pub fn db_clone(&self) -> DatabaseConnection {
        self.db.clone()
    }

    /// Cloned topic manager (cheap; all clones share the same topics).
    pub fn ws_clone(&self) -> WebSocketManager {
        self.ws.clone()
    }
}
