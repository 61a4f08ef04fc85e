//! The dashboard WebSocket protocol.
//!
//! Inbound messages are tagged with a `type` field. Outbound messages use
//! the `{ "type": ..., "data": ... }` envelope so clients can dispatch on
//! the kind before touching the payload.

use serde::{Deserialize, Serialize};
use werkstatt_sync::ViewSnapshot;

/// Messages a dashboard client can send.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ClientMessage {
    /// Replace the filter. Omitted dimensions clear to "no filter";
    /// `"all"` and unknown status names mean the same thing.
    SetFilter {
        #[serde(default)]
        query: String,
        #[serde(default)]
        status: Option<String>,
        #[serde(default)]
        device: Option<String>,
    },
    /// Reveal one more page of the current listing.
    LoadMore,
}

/// Messages pushed to dashboard clients.
#[derive(Debug, Serialize)]
#[serde(tag = "type", content = "data", rename_all = "camelCase")]
pub enum ServerMessage {
    /// The full dashboard view after a connect, a filter change, or a
    /// store update.
    View(ViewSnapshot),
}
