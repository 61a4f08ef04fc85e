//! Synchronized customer collections.
//!
//! This crate keeps in-memory mirrors of the remote store partitions and
//! layers the domain workflows on top:
//!
//! - [`CollectionMirror`] applies full snapshots from a store subscription
//!   and serves ordered reads
//! - [`ChangeBus`] broadcasts a [`ChangeEvent`] for every applied snapshot
//! - [`CustomerDirectory`] owns the store handle and both mirrors and
//!   executes creates, updates, deletes and archive transfers
//! - [`RecordEditor`] turns an edit-form draft into a [`SavePlan`]
//! - [`DashboardView`] holds per-session filter and pagination state and
//!   projects the visible slice of a mirror

pub mod bus;
pub mod directory;
pub mod editor;
pub mod mirror;
pub mod view;

pub use bus::{ChangeBus, ChangeEvent};
pub use directory::{CustomerDirectory, DirectoryError, SaveOutcome};
pub use editor::{RecordEditor, SavePlan};
pub use mirror::{CollectionMirror, LoadPhase};
pub use view::{project, DashboardView, Projection, ViewSnapshot};
