//! In-process [`RecordStore`] used by tests and local development runs.
//!
//! Mutation and snapshot publishing happen under one lock so subscribers
//! observe every change exactly once and in order.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::{mpsc, RwLock};
use werkstatt_core::customer::Customer;

use crate::adapter::{Partition, RecordStore, Snapshot, SnapshotSender, SnapshotStream, StoreError};
use crate::seed;

#[derive(Default)]
struct Inner {
    partitions: HashMap<Partition, Snapshot>,
    subscribers: HashMap<Partition, Vec<SnapshotSender>>,
}

impl Inner {
    /// Push the partition's current snapshot to every live subscriber,
    /// pruning senders whose receivers have been dropped.
    fn publish(&mut self, partition: Partition) {
        let snapshot = self.partitions.get(&partition).cloned().unwrap_or_default();
        if let Some(senders) = self.subscribers.get_mut(&partition) {
            senders.retain(|tx| tx.send(snapshot.clone()).is_ok());
        }
    }
}

/// In-memory store over both partitions.
///
/// Designed to be wrapped in `Arc` and shared; all methods take `&self`.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-populated with the demo customer records in the live
    /// partition.
    pub fn seeded() -> Self {
        let mut inner = Inner::default();
        let live = inner.partitions.entry(Partition::Live).or_default();
        for (id, customer) in seed::demo_records() {
            live.insert(id, customer);
        }
        Self {
            inner: RwLock::new(inner),
        }
    }

    /// Number of live subscriber channels for a partition. Closed channels
    /// are only counted until the next publish prunes them.
    pub async fn subscriber_count(&self, partition: Partition) -> usize {
        self.inner
            .read()
            .await
            .subscribers
            .get(&partition)
            .map_or(0, Vec::len)
    }

    /// Current record count in a partition.
    pub async fn len(&self, partition: Partition) -> usize {
        self.inner
            .read()
            .await
            .partitions
            .get(&partition)
            .map_or(0, HashMap::len)
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn subscribe(&self, partition: Partition) -> Result<SnapshotStream, StoreError> {
        let (tx, rx) = mpsc::unbounded_channel();

        let mut inner = self.inner.write().await;
        let snapshot = inner.partitions.get(&partition).cloned().unwrap_or_default();
        // Deliver the current state immediately so new subscribers never
        // start from an empty view.
        let _ = tx.send(snapshot);
        inner.subscribers.entry(partition).or_default().push(tx);

        Ok(rx)
    }

    async fn write(
        &self,
        partition: Partition,
        id: &str,
        record: &Customer,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        inner
            .partitions
            .entry(partition)
            .or_default()
            .insert(id.to_string(), record.clone());
        inner.publish(partition);
        Ok(())
    }

    async fn create(&self, partition: Partition, record: &Customer) -> Result<(), StoreError> {
        let id = uuid::Uuid::new_v4().to_string();
        let mut inner = self.inner.write().await;
        inner
            .partitions
            .entry(partition)
            .or_default()
            .insert(id, record.clone());
        inner.publish(partition);
        Ok(())
    }

    async fn delete(&self, partition: Partition, id: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        let removed = inner
            .partitions
            .entry(partition)
            .or_default()
            .remove(id)
            .is_some();
        // Deleting an absent id changes nothing, so nothing is published.
        if removed {
            inner.publish(partition);
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
