//! The customer directory: one store handle, both partition mirrors, and
//! the write-side operations of the dashboard.
//!
//! Constructed once at startup and shared via `Arc`. Reads go to the
//! mirrors; writes go straight to the store and become visible through the
//! next snapshot (the directory never patches a mirror locally).

use std::sync::Arc;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use werkstatt_core::filter::device_options;
use werkstatt_core::types::RecordId;
use werkstatt_store::{Partition, RecordStore, StoreError};

use crate::bus::{ChangeBus, ChangeEvent};
use crate::editor::SavePlan;
use crate::mirror::CollectionMirror;

/// A failed directory operation.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("Customer not found: {0}")]
    NotFound(RecordId),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// What [`CustomerDirectory::apply`] did with a save plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Created,
    Updated,
    /// The plan was a no-op; nothing was written.
    Unchanged,
}

/// Coordinator for the live and archived customer collections.
pub struct CustomerDirectory {
    store: Arc<dyn RecordStore>,
    live: Arc<CollectionMirror>,
    archive: Arc<CollectionMirror>,
    bus: ChangeBus,
    mirror_tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl CustomerDirectory {
    /// Subscribe to both partitions and start a mirror task for each.
    ///
    /// A partition whose subscription fails comes up in the `Failed` phase
    /// and stays there; the other partition is unaffected.
    pub async fn start(store: Arc<dyn RecordStore>) -> Arc<Self> {
        let directory = Arc::new(Self {
            store,
            live: Arc::new(CollectionMirror::new(Partition::Live)),
            archive: Arc::new(CollectionMirror::new(Partition::Archive)),
            bus: ChangeBus::new(),
            mirror_tasks: Mutex::new(Vec::new()),
        });

        directory.start_mirror(Partition::Live).await;
        directory.start_mirror(Partition::Archive).await;
        directory
    }

    async fn start_mirror(&self, partition: Partition) {
        let mirror = Arc::clone(self.mirror(partition));
        match self.store.subscribe(partition).await {
            Ok(stream) => {
                let task = tokio::spawn(mirror.run(stream, self.bus.clone()));
                self.mirror_tasks.lock().await.push(task);
            }
            Err(e) => {
                tracing::error!(partition = %partition, error = %e, "Store subscription failed");
                mirror.mark_failed(e.to_string()).await;
            }
        }
    }

    fn mirror(&self, partition: Partition) -> &Arc<CollectionMirror> {
        match partition {
            Partition::Live => &self.live,
            Partition::Archive => &self.archive,
        }
    }

    pub fn live_mirror(&self) -> &CollectionMirror {
        &self.live
    }

    pub fn archive_mirror(&self) -> &CollectionMirror {
        &self.archive
    }

    /// Subscribe to snapshot-applied events from both mirrors.
    pub fn subscribe_changes(&self) -> tokio::sync::broadcast::Receiver<ChangeEvent> {
        self.bus.subscribe()
    }

    /// Execute a save plan against the live partition.
    pub async fn apply(&self, plan: SavePlan) -> Result<SaveOutcome, DirectoryError> {
        match plan {
            SavePlan::Create(record) => {
                self.store.create(Partition::Live, &record).await?;
                Ok(SaveOutcome::Created)
            }
            SavePlan::Update { id, record } => {
                self.store.write(Partition::Live, &id, &record).await?;
                Ok(SaveOutcome::Updated)
            }
            SavePlan::Unchanged => Ok(SaveOutcome::Unchanged),
        }
    }

    /// Hard-delete a live record. Deleting an unknown id is a no-op.
    pub async fn remove(&self, id: &str) -> Result<(), DirectoryError> {
        self.store.delete(Partition::Live, id).await?;
        Ok(())
    }

    /// Move a live record to the archive, values and edit timestamps
    /// untouched.
    pub async fn archive(&self, id: &str) -> Result<(), DirectoryError> {
        self.transfer(id, Partition::Live, Partition::Archive).await
    }

    /// Move an archived record back to the live collection.
    pub async fn restore(&self, id: &str) -> Result<(), DirectoryError> {
        self.transfer(id, Partition::Archive, Partition::Live).await
    }

    async fn transfer(
        &self,
        id: &str,
        from: Partition,
        to: Partition,
    ) -> Result<(), DirectoryError> {
        let record = self
            .mirror(from)
            .get(id)
            .await
            .ok_or_else(|| DirectoryError::NotFound(id.to_string()))?;

        // Copy before delete: a failure in between duplicates the record
        // across partitions but never loses it. The store has no
        // multi-key transaction, so this is the accepted trade-off.
        self.store.write(to, id, &record.customer).await?;
        if let Err(e) = self.store.delete(from, id).await {
            tracing::warn!(
                id = %id,
                from = %from,
                to = %to,
                error = %e,
                "Record copied but source delete failed; it now exists in both partitions"
            );
            return Err(e.into());
        }
        Ok(())
    }

    /// Distinct, sorted device names across live and archived records.
    pub async fn device_options(&self) -> Vec<String> {
        let live = self.live.records().await;
        let archive = self.archive.records().await;
        device_options(live.iter().chain(archive.iter()))
    }

    /// Stop the mirror tasks. Store subscriptions are shut down separately
    /// by whoever owns the store.
    pub async fn shutdown(&self) {
        let mut tasks = self.mirror_tasks.lock().await;
        for task in tasks.drain(..) {
            task.abort();
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
