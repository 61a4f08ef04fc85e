//! Werkstatt domain core: the customer record model and the pure logic
//! that operates on it.
//!
//! Everything in this crate is synchronous and side-effect free so it can
//! be used by the sync layer, the API handlers, and any future CLI tooling:
//!
//! - [`customer`] -- record shapes ([`Customer`], [`EditableField`],
//!   [`Status`]) and their wire formats.
//! - [`filter`] -- the dashboard filter/search engine.
//! - [`merge`] -- field-level edit tracking when a draft is saved.
//! - [`page`] -- the grow-only visible window over a filtered list.
//! - [`validate`] -- form-level draft validation.

pub mod customer;
pub mod error;
pub mod filter;
pub mod merge;
pub mod page;
pub mod types;
pub mod validate;

pub use customer::{Customer, CustomerDraft, CustomerRecord, EditableField, Status};
pub use error::CoreError;
pub use filter::ListFilter;
pub use page::VisibleWindow;
pub use validate::FieldViolation;
