//! AI-assisted refinement of customer notes.
//!
//! The dashboard offers one AI action: rewrite the free-text notes of a
//! record so that important details stand out and obvious errors are
//! corrected. [`NotesRefiner`] is the seam the API layer depends on;
//! [`HttpRefiner`] implements it against any OpenAI-compatible
//! chat-completions endpoint.

pub mod client;
pub mod messages;

pub use client::{HttpRefiner, NotesRefiner, RefineError};
