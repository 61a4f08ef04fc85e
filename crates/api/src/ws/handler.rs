use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::broadcast;
use werkstatt_core::customer::Status;
use werkstatt_core::CoreError;
use werkstatt_sync::DashboardView;

use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::state::AppState;
use crate::ws::messages::{ClientMessage, ServerMessage};

/// Query parameters accepted by the WebSocket endpoint.
#[derive(Debug, Deserialize)]
pub struct WsParams {
    /// Access token. Browsers cannot set headers on WebSocket requests,
    /// so the token travels as a query parameter instead.
    token: Option<String>,
}

/// HTTP handler that authenticates and upgrades the connection.
///
/// Authentication happens before the upgrade: a missing or invalid token
/// is rejected as a plain 401 and no socket is opened.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<WsParams>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let token = params.token.as_deref().ok_or_else(|| {
        AppError::Core(CoreError::Unauthorized("Missing token query parameter".into()))
    })?;

    let claims = validate_token(token, &state.config.jwt)
        .map_err(|_| AppError::Core(CoreError::Unauthorized("Invalid or expired token".into())))?;

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, state, claims.sub)))
}

/// Manage a single WebSocket connection after upgrade.
///
/// Splits the socket into a sink (outbound) and stream (inbound), then:
///   1. Registers the connection with `WsManager`.
///   2. Spawns a sender task that forwards messages from the manager channel.
///   3. Pushes the initial view, then reacts to inbound messages and store
///      changes on the current task.
///   4. Cleans up on disconnect.
async fn handle_socket(socket: WebSocket, state: AppState, email: String) {
    let conn_id = uuid::Uuid::new_v4().to_string();
    tracing::info!(conn_id = %conn_id, email = %email, "WebSocket connected");

    // Register and get the receiver for outbound messages.
    let mut rx = state.ws_manager.add(conn_id.clone(), email).await;
    let mut changes = state.directory.subscribe_changes();
    let mut view = DashboardView::new();

    let (mut sink, mut stream) = socket.split();

    // Sender task: forward channel messages to the WebSocket sink.
    let sender_conn_id = conn_id.clone();
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sink.send(msg).await.is_err() {
                tracing::debug!(conn_id = %sender_conn_id, "WebSocket sink closed");
                break;
            }
        }
    });

    // Every client starts with the current view.
    push_view(&state, &conn_id, &view).await;

    loop {
        tokio::select! {
            inbound = stream.next() => match inbound {
                Some(Ok(Message::Text(text))) => {
                    if handle_client_message(&text, &mut view) {
                        push_view(&state, &conn_id, &view).await;
                    }
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(Message::Pong(_))) => {
                    tracing::trace!(conn_id = %conn_id, "Pong received");
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::debug!(conn_id = %conn_id, error = %e, "WebSocket receive error");
                    break;
                }
            },
            change = changes.recv() => match change {
                // Device options span both partitions, so archive changes
                // can affect the snapshot too.
                Ok(_) => push_view(&state, &conn_id, &view).await,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(conn_id = %conn_id, skipped, "Change stream lagged; resyncing");
                    push_view(&state, &conn_id, &view).await;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
        }
    }

    // Clean up: remove connection and abort sender task.
    if let Some(conn) = state.ws_manager.remove(&conn_id).await {
        let connected_secs = (chrono::Utc::now() - conn.connected_at).num_seconds();
        tracing::info!(
            conn_id = %conn_id,
            email = %conn.email,
            connected_secs,
            "WebSocket disconnected"
        );
    }
    send_task.abort();
}

/// Apply a parsed client message to the per-connection view.
///
/// Returns whether the view should be re-projected and pushed. Unknown or
/// malformed messages are logged and ignored; they never close the socket.
fn handle_client_message(text: &str, view: &mut DashboardView) -> bool {
    match serde_json::from_str::<ClientMessage>(text) {
        Ok(ClientMessage::SetFilter {
            query,
            status,
            device,
        }) => {
            view.set_query(query);
            view.set_status(status.as_deref().and_then(Status::parse));
            view.set_device(device.filter(|d| d != "all" && !d.is_empty()));
            true
        }
        Ok(ClientMessage::LoadMore) => {
            view.load_more();
            true
        }
        Err(e) => {
            tracing::warn!(error = %e, raw = %text, "Unknown or malformed incoming message");
            false
        }
    }
}

/// Project the connection's view over the live mirror and send it.
async fn push_view(state: &AppState, conn_id: &str, view: &DashboardView) {
    let mirror = state.directory.live_mirror();
    let records = mirror.records().await;
    let phase = mirror.phase().await;
    let devices = state.directory.device_options().await;

    let snapshot = view.snapshot(&records, &phase, devices);
    match serde_json::to_string(&ServerMessage::View(snapshot)) {
        Ok(json) => {
            state
                .ws_manager
                .send_to(conn_id, Message::Text(json.into()))
                .await;
        }
        Err(e) => {
            tracing::error!(conn_id = %conn_id, error = %e, "Failed to serialize view snapshot");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_filter_treats_all_and_unknown_as_no_filter() {
        let mut view = DashboardView::new();

        assert!(handle_client_message(
            r#"{ "type": "setFilter", "status": "all", "device": "all" }"#,
            &mut view,
        ));
        assert_eq!(view.filter().status, None);
        assert_eq!(view.filter().device, None);

        assert!(handle_client_message(
            r#"{ "type": "setFilter", "status": "finished" }"#,
            &mut view,
        ));
        assert_eq!(view.filter().status, None);
    }

    #[test]
    fn set_filter_applies_known_dimensions() {
        let mut view = DashboardView::new();

        assert!(handle_client_message(
            r#"{ "type": "setFilter", "query": "miele", "status": "in-progress", "device": "Miele W1" }"#,
            &mut view,
        ));
        assert_eq!(view.filter().query, "miele");
        assert_eq!(view.filter().status, Some(Status::InProgress));
        assert_eq!(view.filter().device.as_deref(), Some("Miele W1"));
    }

    #[test]
    fn load_more_grows_the_window() {
        let mut view = DashboardView::new();
        let before = view.window().limit();

        assert!(handle_client_message(r#"{ "type": "loadMore" }"#, &mut view));
        assert!(view.window().limit() > before);
    }

    #[test]
    fn malformed_message_is_ignored() {
        let mut view = DashboardView::new();
        assert!(!handle_client_message("not json at all", &mut view));
        assert!(!handle_client_message(
            r#"{ "type": "selfDestruct" }"#,
            &mut view,
        ));
    }
}
