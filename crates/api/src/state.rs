use std::sync::Arc;

use cnfs_db::store::Store;

use crate::auth::session::SessionManager;
use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; everything inside is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Persistence. `PgStore` in production, `MemoryStore` in tests.
    pub store: Arc<dyn Store>,
    /// Credential issuance and session lifecycle.
    pub sessions: Arc<SessionManager>,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, sessions: SessionManager, config: ServerConfig) -> Self {
        Self {
            store,
            sessions: Arc::new(sessions),
            config: Arc::new(config),
        }
    }
}
