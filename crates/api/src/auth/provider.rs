//! Account backend: sign-up and sign-in.
//!
//! [`IdentityProvider`] is the seam between the auth handlers and whatever
//! stores accounts. The bundled [`LocalIdentity`] keeps accounts in memory
//! with Argon2id-hashed passwords; a hosted auth service can replace it
//! without touching the handlers.

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;

use super::password::{hash_password, verify_password};

/// Minimum password length accepted at sign-up.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Errors surfaced by account operations.
///
/// Sign-in failures collapse into [`IdentityError::InvalidCredentials`] for
/// both unknown emails and wrong passwords, so responses do not reveal which
/// accounts exist.
#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("An account with this email already exists")]
    EmailAlreadyInUse,

    #[error("{0}")]
    WeakPassword(String),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Email address is not valid")]
    InvalidEmail,

    #[error("Identity backend error: {0}")]
    Internal(String),
}

/// Account sign-up and sign-in.
///
/// Implementations own account storage and password checks. Token minting
/// and refresh-session tracking happen elsewhere; both operations return the
/// normalized account email that goes into the token subject.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Create an account. Returns the normalized email on success.
    async fn sign_up(&self, email: &str, password: &str) -> Result<String, IdentityError>;

    /// Check credentials. Returns the normalized email on success.
    async fn sign_in(&self, email: &str, password: &str) -> Result<String, IdentityError>;
}

/// In-memory account backend.
///
/// Accounts live for the lifetime of the process. Suitable for development
/// and for single-instance deployments that provision accounts at startup.
#[derive(Default)]
pub struct LocalIdentity {
    /// Normalized email -> PHC-formatted Argon2id hash.
    accounts: RwLock<HashMap<String, String>>,
}

impl LocalIdentity {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IdentityProvider for LocalIdentity {
    async fn sign_up(&self, email: &str, password: &str) -> Result<String, IdentityError> {
        let email = normalize_email(email)?;

        if password.len() < MIN_PASSWORD_LENGTH {
            return Err(IdentityError::WeakPassword(format!(
                "Password must be at least {MIN_PASSWORD_LENGTH} characters long"
            )));
        }

        let hash = hash_password(password).map_err(|e| IdentityError::Internal(e.to_string()))?;

        let mut accounts = self.accounts.write().await;
        if accounts.contains_key(&email) {
            return Err(IdentityError::EmailAlreadyInUse);
        }
        accounts.insert(email.clone(), hash);

        Ok(email)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<String, IdentityError> {
        let email = normalize_email(email)?;

        let accounts = self.accounts.read().await;
        let Some(hash) = accounts.get(&email) else {
            return Err(IdentityError::InvalidCredentials);
        };

        match verify_password(password, hash) {
            Ok(true) => Ok(email),
            Ok(false) => Err(IdentityError::InvalidCredentials),
            Err(e) => Err(IdentityError::Internal(e.to_string())),
        }
    }
}

/// Trim, lowercase, and shape-check an email address.
fn normalize_email(email: &str) -> Result<String, IdentityError> {
    let email = email.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(email),
        _ => Err(IdentityError::InvalidEmail),
    }
}
