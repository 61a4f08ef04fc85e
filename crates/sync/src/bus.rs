//! In-process broadcast hub for collection changes.
//!
//! Every time a mirror applies a snapshot it publishes a [`ChangeEvent`]
//! here. Subscribers (the WebSocket fan-out, tests) get their own receiver
//! and may lag or disconnect without affecting the publisher.

use std::sync::Arc;

use tokio::sync::broadcast;
use werkstatt_core::customer::CustomerRecord;
use werkstatt_core::types::Timestamp;
use werkstatt_store::Partition;

/// Default capacity of the broadcast channel. Slow subscribers that fall
/// more than this many events behind start losing the oldest ones.
const DEFAULT_CAPACITY: usize = 1024;

/// One applied snapshot, as seen by subscribers.
///
/// `records` is the partition's full ordered contents after the snapshot,
/// shared rather than copied per subscriber.
#[derive(Debug, Clone)]
pub struct ChangeEvent {
    pub partition: Partition,
    pub records: Arc<Vec<CustomerRecord>>,
    pub at: Timestamp,
}

/// Cloneable handle to the change broadcast channel.
#[derive(Debug, Clone)]
pub struct ChangeBus {
    sender: broadcast::Sender<ChangeEvent>,
}

impl ChangeBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all current subscribers.
    ///
    /// A send error only means nobody is listening right now, which is
    /// normal (e.g. no WebSocket clients connected), so it is ignored.
    pub fn publish(&self, event: ChangeEvent) {
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for ChangeBus {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
