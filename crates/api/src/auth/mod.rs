//! Authentication primitives.
//!
//! - [`password`] -- Argon2id password hashing and verification.
//! - [`jwt`] -- JWT access-token generation, validation, and refresh-token helpers.
//! - [`provider`] -- account backend (sign-up / sign-in).
//! - [`sessions`] -- refresh-session registry.

pub mod jwt;
pub mod password;
pub mod provider;
pub mod sessions;
