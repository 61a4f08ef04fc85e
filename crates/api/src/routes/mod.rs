pub mod auth;
pub mod customers;
pub mod health;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;
use crate::ws;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /ws                          dashboard WebSocket (token query param)
///
/// /auth/signup                 create account (public)
/// /auth/login                  login (public)
/// /auth/refresh                rotate tokens (public)
/// /auth/logout                 revoke sessions (requires auth)
///
/// /customers                   list, create
/// /customers/archived          list archived
/// /customers/devices           device dropdown options
/// /customers/refine-notes      AI notes refinement (POST)
/// /customers/{id}              update, delete
/// /customers/{id}/archive      move to archive (POST)
/// /customers/{id}/restore      move back to live (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // WebSocket endpoint.
        .route("/ws", get(ws::ws_handler))
        // Authentication routes (signup, login, refresh, logout).
        .nest("/auth", auth::router())
        // Customer records (live + archived collections).
        .nest("/customers", customers::router())
}
