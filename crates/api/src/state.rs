use std::sync::Arc;

use werkstatt_refine::NotesRefiner;
use werkstatt_sync::CustomerDirectory;

use crate::auth::provider::IdentityProvider;
use crate::auth::sessions::SessionRegistry;
use crate::config::ServerConfig;
use crate::ws::WsManager;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Server configuration (read by middleware and handlers).
    pub config: Arc<ServerConfig>,
    /// Mirrored customer collections plus write access to the record store.
    pub directory: Arc<CustomerDirectory>,
    /// Account backend for sign-up / sign-in.
    pub identity: Arc<dyn IdentityProvider>,
    /// Active refresh sessions.
    pub sessions: Arc<SessionRegistry>,
    /// Notes-refinement client.
    pub refiner: Arc<dyn NotesRefiner>,
    /// WebSocket connection manager (dashboard clients).
    pub ws_manager: Arc<WsManager>,
}
