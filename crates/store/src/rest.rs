//! REST [`RecordStore`] speaking the Firebase-RTDB dialect.
//!
//! Collections live at `{base}/{path}.json`, single records at
//! `{base}/{path}/{id}.json`, with an optional `auth` query parameter on
//! every request. Live updates come from a server-sent-events feed on the
//! collection URL: every `put`/`patch` event triggers a full re-fetch of the
//! partition, which keeps the full-snapshot contract without interpreting
//! event payload paths.

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use werkstatt_core::customer::Customer;

use crate::adapter::{Partition, RecordStore, Snapshot, SnapshotSender, SnapshotStream, StoreError};
use crate::reconnect::{next_delay, ReconnectConfig};

/// Timeout for plain request/response calls. The event-stream request is
/// deliberately left without one; it is expected to stay open.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// ---------------------------------------------------------------------------
// RestStore
// ---------------------------------------------------------------------------

/// Remote store client for one database instance.
///
/// Cheap to share behind an `Arc`; each subscription spawns its own feed
/// task, all of which stop when [`shutdown`](Self::shutdown) is called.
pub struct RestStore {
    client: reqwest::Client,
    base_url: String,
    auth_token: Option<String>,
    cancel: CancellationToken,
}

impl RestStore {
    /// Create a client for the database at `base_url` (scheme + host, no
    /// trailing slash required).
    pub fn new(base_url: impl Into<String>, auth_token: Option<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: reqwest::Client::new(),
            base_url,
            auth_token,
            cancel: CancellationToken::new(),
        }
    }

    /// Stop every feed task spawned by this store. Idempotent.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    /// Human-readable target for log and error messages. Never includes the
    /// auth token.
    fn target(partition: Partition, id: &str) -> String {
        format!("{}/{id}", partition.path())
    }
}

#[async_trait]
impl RecordStore for RestStore {
    async fn subscribe(&self, partition: Partition) -> Result<SnapshotStream, StoreError> {
        // Fail fast: if the partition cannot be read now there is nothing
        // to feed. The caller surfaces this as a persistent failure state.
        let snapshot = fetch_snapshot(
            &self.client,
            &self.base_url,
            partition,
            self.auth_token.as_deref(),
        )
        .await?;

        let (tx, rx) = mpsc::unbounded_channel();
        let _ = tx.send(snapshot);

        let feed = SnapshotFeed {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            auth_token: self.auth_token.clone(),
            partition,
            tx,
            cancel: self.cancel.child_token(),
        };
        tokio::spawn(feed.run());

        Ok(rx)
    }

    async fn write(
        &self,
        partition: Partition,
        id: &str,
        record: &Customer,
    ) -> Result<(), StoreError> {
        let url = record_url(&self.base_url, partition, id, self.auth_token.as_deref());
        let request = self.client.put(url).timeout(REQUEST_TIMEOUT).json(record);
        send_write(request, "PUT", Self::target(partition, id)).await
    }

    async fn create(&self, partition: Partition, record: &Customer) -> Result<(), StoreError> {
        let url = collection_url(&self.base_url, partition, self.auth_token.as_deref());
        let request = self.client.post(url).timeout(REQUEST_TIMEOUT).json(record);
        // The response body carries the assigned id, which we deliberately
        // ignore: new records become visible through the next snapshot.
        send_write(request, "POST", partition.path().to_string()).await
    }

    async fn delete(&self, partition: Partition, id: &str) -> Result<(), StoreError> {
        let url = record_url(&self.base_url, partition, id, self.auth_token.as_deref());
        let request = self.client.delete(url).timeout(REQUEST_TIMEOUT);
        send_write(request, "DELETE", Self::target(partition, id)).await
    }
}

/// Issue a mutating request and map any failure into [`StoreError::Write`].
async fn send_write(
    request: reqwest::RequestBuilder,
    verb: &'static str,
    target: String,
) -> Result<(), StoreError> {
    let response = request
        .send()
        .await
        .map_err(|e| StoreError::Write(format!("{verb} {target}: {e}")))?;

    if response.status().is_success() {
        Ok(())
    } else {
        Err(StoreError::Write(format!(
            "{verb} {target}: HTTP {}",
            response.status()
        )))
    }
}

// ---------------------------------------------------------------------------
// Snapshot fetching
// ---------------------------------------------------------------------------

/// Read the full contents of one partition.
async fn fetch_snapshot(
    client: &reqwest::Client,
    base_url: &str,
    partition: Partition,
    auth_token: Option<&str>,
) -> Result<Snapshot, StoreError> {
    let url = collection_url(base_url, partition, auth_token);
    let response = client
        .get(url)
        .timeout(REQUEST_TIMEOUT)
        .send()
        .await
        .map_err(|e| StoreError::Subscribe(format!("GET {partition}: {e}")))?;

    if !response.status().is_success() {
        return Err(StoreError::Subscribe(format!(
            "GET {partition}: HTTP {}",
            response.status()
        )));
    }

    let body: Value = response
        .json()
        .await
        .map_err(|e| StoreError::Subscribe(format!("GET {partition}: invalid JSON: {e}")))?;

    Ok(parse_snapshot(partition, body))
}

/// Turn the raw collection body into a snapshot.
///
/// An empty collection is the JSON literal `null`. Records that fail to
/// deserialize are skipped with a warning rather than poisoning the whole
/// snapshot.
fn parse_snapshot(partition: Partition, body: Value) -> Snapshot {
    match body {
        Value::Null => Snapshot::new(),
        Value::Object(entries) => {
            let mut snapshot = Snapshot::new();
            for (id, value) in entries {
                match serde_json::from_value::<Customer>(value) {
                    Ok(customer) => {
                        snapshot.insert(id, customer);
                    }
                    Err(e) => {
                        tracing::warn!(
                            partition = %partition,
                            id = %id,
                            error = %e,
                            "Skipping malformed record in snapshot"
                        );
                    }
                }
            }
            snapshot
        }
        other => {
            tracing::warn!(
                partition = %partition,
                body_type = body_type_name(&other),
                "Unexpected collection body, treating as empty"
            );
            Snapshot::new()
        }
    }
}

fn body_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ---------------------------------------------------------------------------
// URL building
// ---------------------------------------------------------------------------

fn collection_url(base_url: &str, partition: Partition, auth_token: Option<&str>) -> String {
    with_auth(format!("{base_url}/{}.json", partition.path()), auth_token)
}

fn record_url(base_url: &str, partition: Partition, id: &str, auth_token: Option<&str>) -> String {
    with_auth(
        format!("{base_url}/{}/{id}.json", partition.path()),
        auth_token,
    )
}

fn with_auth(url: String, auth_token: Option<&str>) -> String {
    match auth_token {
        Some(token) => format!("{url}?auth={token}"),
        None => url,
    }
}

// ---------------------------------------------------------------------------
// Event feed
// ---------------------------------------------------------------------------

/// Why an established event stream stopped.
enum FeedExit {
    /// The subscriber dropped its stream; the feed is no longer needed.
    SubscriberGone,
    /// Shutdown was requested.
    Cancelled,
    /// The connection ended or the server asked us to re-establish it.
    StreamEnded,
}

/// Long-lived task that holds the SSE connection for one subscription and
/// re-fetches the partition whenever the server reports a change.
struct SnapshotFeed {
    client: reqwest::Client,
    base_url: String,
    auth_token: Option<String>,
    partition: Partition,
    tx: SnapshotSender,
    cancel: CancellationToken,
}

impl SnapshotFeed {
    async fn run(self) {
        let config = ReconnectConfig::default();
        let mut delay = config.initial_delay;

        loop {
            if self.tx.is_closed() || self.cancel.is_cancelled() {
                return;
            }

            match self.stream_events().await {
                Ok(FeedExit::SubscriberGone) => {
                    tracing::debug!(partition = %self.partition, "Snapshot subscriber gone");
                    return;
                }
                Ok(FeedExit::Cancelled) => return,
                Ok(FeedExit::StreamEnded) => {
                    // The connection was healthy before it dropped, so the
                    // backoff starts over.
                    delay = config.initial_delay;
                    tracing::warn!(partition = %self.partition, "Snapshot feed ended, reconnecting");
                }
                Err(e) => {
                    tracing::warn!(partition = %self.partition, error = %e, "Snapshot feed error");
                }
            }

            tokio::select! {
                _ = self.cancel.cancelled() => return,
                _ = tokio::time::sleep(delay) => {}
            }
            delay = next_delay(delay, &config);
        }
    }

    /// Hold one SSE connection until it ends, forwarding a fresh snapshot
    /// to the subscriber for every change event.
    async fn stream_events(&self) -> Result<FeedExit, StoreError> {
        let url = collection_url(&self.base_url, self.partition, self.auth_token.as_deref());
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .send()
            .await
            .map_err(|e| StoreError::Subscribe(format!("feed {}: {e}", self.partition)))?;

        if !response.status().is_success() {
            return Err(StoreError::Subscribe(format!(
                "feed {}: HTTP {}",
                self.partition,
                response.status()
            )));
        }

        let mut stream = Box::pin(response.bytes_stream());
        let mut buffer = String::new();

        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => return Ok(FeedExit::Cancelled),
                chunk = stream.next() => {
                    let Some(chunk) = chunk else {
                        return Ok(FeedExit::StreamEnded);
                    };
                    let chunk = chunk.map_err(|e| {
                        StoreError::Subscribe(format!("feed {}: {e}", self.partition))
                    })?;
                    buffer.push_str(&String::from_utf8_lossy(&chunk));

                    while let Some(end) = buffer.find("\n\n") {
                        let block: String = buffer.drain(..end + 2).collect();
                        let Some(event) = parse_sse_block(&block) else {
                            continue;
                        };
                        if let Some(exit) = self.handle_event(&event).await? {
                            return Ok(exit);
                        }
                    }
                }
            }
        }
    }

    /// React to a single feed event. Returns `Some(exit)` when the feed
    /// should stop processing this connection.
    async fn handle_event(&self, event: &SseEvent) -> Result<Option<FeedExit>, StoreError> {
        match event.name.as_str() {
            // Any change event invalidates our view; re-fetch the whole
            // partition rather than applying the delta.
            "put" | "patch" => {
                let snapshot = fetch_snapshot(
                    &self.client,
                    &self.base_url,
                    self.partition,
                    self.auth_token.as_deref(),
                )
                .await?;
                if self.tx.send(snapshot).is_err() {
                    return Ok(Some(FeedExit::SubscriberGone));
                }
                Ok(None)
            }
            "keep-alive" => Ok(None),
            // The server closes feeds on permission changes or credential
            // expiry; reconnecting re-reads everything.
            "cancel" | "auth_revoked" => {
                tracing::info!(
                    partition = %self.partition,
                    event = %event.name,
                    "Snapshot feed closed by server"
                );
                Ok(Some(FeedExit::StreamEnded))
            }
            other => {
                tracing::debug!(partition = %self.partition, event = %other, "Ignoring feed event");
                Ok(None)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// SSE parsing
// ---------------------------------------------------------------------------

/// One parsed server-sent event.
#[derive(Debug, PartialEq, Eq)]
struct SseEvent {
    name: String,
    data: String,
}

/// Parse one event block (the text between blank lines).
///
/// Handles the subset of the SSE format the store emits: `event:` and
/// `data:` lines plus `:` comments. Multi-line data is joined with `\n`.
/// Returns `None` for blocks without any data line.
fn parse_sse_block(block: &str) -> Option<SseEvent> {
    let mut name = "message".to_string();
    let mut data_lines: Vec<&str> = Vec::new();

    for line in block.lines() {
        if line.starts_with(':') {
            continue;
        }
        if let Some(value) = line.strip_prefix("event:") {
            name = value.trim_start_matches(' ').to_string();
        } else if let Some(value) = line.strip_prefix("data:") {
            data_lines.push(value.strip_prefix(' ').unwrap_or(value));
        }
    }

    if data_lines.is_empty() {
        return None;
    }

    Some(SseEvent {
        name,
        data: data_lines.join("\n"),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -- URL building --------------------------------------------------------

    #[test]
    fn collection_url_appends_json_suffix() {
        let url = collection_url("https://db.example.com", Partition::Live, None);
        assert_eq!(url, "https://db.example.com/customers.json");
    }

    #[test]
    fn record_url_targets_single_record() {
        let url = record_url("https://db.example.com", Partition::Archive, "abc-1", None);
        assert_eq!(url, "https://db.example.com/archivedCustomers/abc-1.json");
    }

    #[test]
    fn auth_token_becomes_query_parameter() {
        let url = collection_url("https://db.example.com", Partition::Live, Some("sekrit"));
        assert_eq!(url, "https://db.example.com/customers.json?auth=sekrit");
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let store = RestStore::new("https://db.example.com/", None);
        assert_eq!(store.base_url, "https://db.example.com");
    }

    // -- SSE parsing -----------------------------------------------------------

    #[test]
    fn parses_put_event() {
        let block = "event: put\ndata: {\"path\":\"/\",\"data\":null}";
        let event = parse_sse_block(block).expect("valid event block");
        assert_eq!(event.name, "put");
        assert_eq!(event.data, "{\"path\":\"/\",\"data\":null}");
    }

    #[test]
    fn parses_keep_alive() {
        let event = parse_sse_block("event: keep-alive\ndata: null").expect("valid block");
        assert_eq!(event.name, "keep-alive");
        assert_eq!(event.data, "null");
    }

    #[test]
    fn event_name_defaults_to_message() {
        let event = parse_sse_block("data: hello").expect("data-only block");
        assert_eq!(event.name, "message");
        assert_eq!(event.data, "hello");
    }

    #[test]
    fn comments_and_blockless_lines_are_ignored() {
        assert_eq!(parse_sse_block(": just a comment"), None);
        assert_eq!(parse_sse_block("event: put"), None, "no data line");
    }

    #[test]
    fn multi_line_data_is_joined() {
        let event = parse_sse_block("event: put\ndata: line1\ndata: line2").expect("valid");
        assert_eq!(event.data, "line1\nline2");
    }

    // -- Snapshot parsing ----------------------------------------------------------

    #[test]
    fn null_body_is_an_empty_snapshot() {
        let snapshot = parse_snapshot(Partition::Live, Value::Null);
        assert!(snapshot.is_empty());
    }

    #[test]
    fn object_body_parses_records() {
        let body = serde_json::json!({
            "r1": {
                "name": { "value": "Anna Schmidt" },
                "address": { "value": "Hauptstraße 12, Köln" },
                "phone": { "value": "0221 456789" },
                "device": { "value": "Miele W1" },
                "errorDescription": { "value": "Trommel dreht nicht" },
                "notes": { "value": "", "lastEdited": "2024-03-02T10:00:00Z" },
                "status": { "value": "in-progress" },
                "createdAt": "2024-03-01T08:00:00Z"
            }
        });

        let snapshot = parse_snapshot(Partition::Live, body);
        assert_eq!(snapshot.len(), 1);
        let record = &snapshot["r1"];
        assert_eq!(record.name.value, "Anna Schmidt");
        assert!(record.notes.last_edited.is_some());
    }

    #[test]
    fn malformed_records_are_skipped_not_fatal() {
        let body = serde_json::json!({
            "bad": { "name": "not an editable field" },
            "good": {
                "name": { "value": "Anna Schmidt" },
                "address": { "value": "Hauptstraße 12, Köln" },
                "phone": { "value": "0221 456789" },
                "device": { "value": "Miele W1" },
                "errorDescription": { "value": "Trommel dreht nicht" },
                "notes": { "value": "" },
                "status": { "value": "completed" },
                "createdAt": "2024-03-01T08:00:00Z"
            }
        });

        let snapshot = parse_snapshot(Partition::Live, body);
        assert_eq!(snapshot.len(), 1);
        assert!(snapshot.contains_key("good"));
    }

    #[test]
    fn non_object_body_is_treated_as_empty() {
        let snapshot = parse_snapshot(Partition::Live, serde_json::json!([1, 2, 3]));
        assert!(snapshot.is_empty());
    }
}
