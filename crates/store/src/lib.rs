//! Remote store adapters for customer records.
//!
//! The rest of the application only ever sees the [`RecordStore`] trait:
//! snapshot subscriptions plus three write operations over two partitions.
//! Two implementations are provided:
//!
//! - [`MemoryStore`] -- in-process store used by tests and local runs.
//! - [`RestStore`] -- Firebase-RTDB-dialect REST client with a server-sent
//!   events feed for live snapshots.

pub mod adapter;
pub mod memory;
pub mod reconnect;
pub mod rest;
pub mod seed;

pub use adapter::{Partition, RecordStore, Snapshot, SnapshotStream, StoreError};
pub use memory::MemoryStore;
pub use rest::RestStore;
