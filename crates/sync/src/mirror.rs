//! In-memory mirror of one store partition.
//!
//! A mirror consumes the snapshot stream of a [`RecordStore`] subscription.
//! Every snapshot **fully replaces** the local list; deltas are never
//! applied. The list is kept sorted newest-first so every reader sees the
//! same order without re-sorting.
//!
//! [`RecordStore`]: werkstatt_store::RecordStore

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::RwLock;
use werkstatt_core::customer::CustomerRecord;
use werkstatt_store::{Partition, Snapshot, SnapshotStream};

use crate::bus::{ChangeBus, ChangeEvent};

/// Where the mirror is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadPhase {
    /// Subscribed, waiting for the first snapshot.
    Loading,
    /// At least one snapshot has been applied.
    Ready,
    /// The subscription could not be established. This state is persistent:
    /// the list stays empty and there is no automatic retry.
    Failed(String),
}

#[derive(Debug)]
struct MirrorState {
    phase: LoadPhase,
    records: Arc<Vec<CustomerRecord>>,
}

/// Mirror of one partition. All mutation happens in [`run`](Self::run);
/// everything else is a read.
#[derive(Debug)]
pub struct CollectionMirror {
    partition: Partition,
    state: RwLock<MirrorState>,
}

impl CollectionMirror {
    pub fn new(partition: Partition) -> Self {
        Self {
            partition,
            state: RwLock::new(MirrorState {
                phase: LoadPhase::Loading,
                records: Arc::new(Vec::new()),
            }),
        }
    }

    pub fn partition(&self) -> Partition {
        self.partition
    }

    pub async fn phase(&self) -> LoadPhase {
        self.state.read().await.phase.clone()
    }

    /// The full ordered contents, shared with the mirror (cheap clone).
    pub async fn records(&self) -> Arc<Vec<CustomerRecord>> {
        Arc::clone(&self.state.read().await.records)
    }

    pub async fn get(&self, id: &str) -> Option<CustomerRecord> {
        self.state
            .read()
            .await
            .records
            .iter()
            .find(|record| record.id == id)
            .cloned()
    }

    pub async fn len(&self) -> usize {
        self.state.read().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.read().await.records.is_empty()
    }

    /// Record that the subscription never came up. Called once, before
    /// [`run`](Self::run) would have started.
    pub async fn mark_failed(&self, reason: String) {
        let mut state = self.state.write().await;
        state.phase = LoadPhase::Failed(reason);
    }

    /// Replace the local list with `snapshot` and return the new contents.
    pub async fn apply_snapshot(&self, snapshot: Snapshot) -> Arc<Vec<CustomerRecord>> {
        let records = Arc::new(sorted_records(snapshot));
        let mut state = self.state.write().await;
        state.phase = LoadPhase::Ready;
        state.records = Arc::clone(&records);
        records
    }

    /// Drive the mirror from a subscription stream, publishing a change
    /// event per applied snapshot. Returns when the stream closes.
    pub async fn run(self: Arc<Self>, mut stream: SnapshotStream, bus: ChangeBus) {
        while let Some(snapshot) = stream.recv().await {
            let records = self.apply_snapshot(snapshot).await;
            tracing::debug!(
                partition = %self.partition,
                records = records.len(),
                "Applied snapshot"
            );
            bus.publish(ChangeEvent {
                partition: self.partition,
                records,
                at: Utc::now(),
            });
        }
        tracing::debug!(partition = %self.partition, "Snapshot stream closed");
    }
}

/// Snapshot order: newest first, ties broken by id so the order is stable
/// across re-fetches.
fn sorted_records(snapshot: Snapshot) -> Vec<CustomerRecord> {
    let mut records: Vec<CustomerRecord> = snapshot
        .into_iter()
        .map(|(id, customer)| CustomerRecord { id, customer })
        .collect();
    records.sort_by(|a, b| {
        b.customer
            .created_at
            .cmp(&a.customer.created_at)
            .then_with(|| a.id.cmp(&b.id))
    });
    records
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
