//! Request handlers.
//!
//! Each submodule provides async handler functions for a single resource.
//! Handlers delegate to the shared [`crate::state::AppState`] services and
//! map errors via [`crate::error::AppError`].

pub mod auth;
pub mod customers;
pub mod refine;
