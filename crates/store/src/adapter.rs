//! The remote store seam: partitions, snapshots, and the [`RecordStore`]
//! trait.
//!
//! Subscriptions deliver the **entire current contents** of a partition on
//! every change, never deltas. Consumers replace their local state wholesale
//! on each snapshot; convergence always comes from the next snapshot, so
//! writers get no read-your-own-writes guarantee through this interface.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::mpsc;
use werkstatt_core::customer::Customer;
use werkstatt_core::types::RecordId;

// ---------------------------------------------------------------------------
// Partitions
// ---------------------------------------------------------------------------

/// The two persisted collections. Both hold the same record shape keyed by
/// id; a record moves between them via archive/restore.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Partition {
    Live,
    Archive,
}

impl Partition {
    /// Both partitions, live first.
    pub const ALL: [Partition; 2] = [Partition::Live, Partition::Archive];

    /// The collection path inside the remote store.
    pub fn path(&self) -> &'static str {
        match self {
            Partition::Live => "customers",
            Partition::Archive => "archivedCustomers",
        }
    }
}

impl std::fmt::Display for Partition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

/// The full current contents of one partition, keyed by record id.
pub type Snapshot = HashMap<RecordId, Customer>;

/// Receiving half of a snapshot subscription. Dropping it unsubscribes;
/// stores prune the matching sender on their next publish.
pub type SnapshotStream = mpsc::UnboundedReceiver<Snapshot>;

/// Sender half held by store implementations.
pub(crate) type SnapshotSender = mpsc::UnboundedSender<Snapshot>;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The snapshot feed could not be established (connectivity or
    /// configuration). Surfaced to readers as a persistent failure state.
    #[error("Store subscription failed: {0}")]
    Subscribe(String),

    /// A write, create, or delete did not reach the store or was rejected.
    /// Writes are never retried; the caller surfaces the failure.
    #[error("Store write failed: {0}")]
    Write(String),
}

// ---------------------------------------------------------------------------
// RecordStore
// ---------------------------------------------------------------------------

/// Remote store operations, object-safe so the concrete backend can be
/// injected at startup.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Open a snapshot subscription to one partition.
    ///
    /// The current snapshot is delivered immediately, followed by every
    /// subsequent one.
    async fn subscribe(&self, partition: Partition) -> Result<SnapshotStream, StoreError>;

    /// Replace the full record stored under `id`.
    async fn write(
        &self,
        partition: Partition,
        id: &str,
        record: &Customer,
    ) -> Result<(), StoreError>;

    /// Store a new record under a fresh store-assigned id.
    ///
    /// Deliberately returns nothing: the new record becomes visible through
    /// the next snapshot, not through this call.
    async fn create(&self, partition: Partition, record: &Customer) -> Result<(), StoreError>;

    /// Remove the record stored under `id`. Removing an absent id is a
    /// no-op, which makes deletes safe to repeat.
    async fn delete(&self, partition: Partition, id: &str) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partition_paths_match_store_collections() {
        assert_eq!(Partition::Live.path(), "customers");
        assert_eq!(Partition::Archive.path(), "archivedCustomers");
    }

    #[test]
    fn partition_display_uses_path() {
        assert_eq!(Partition::Live.to_string(), "customers");
    }
}
