//! In-memory refresh-session registry.
//!
//! Sessions are keyed by the SHA-256 hash of the refresh token, never the
//! plaintext. Redeeming a session removes it, so each refresh token works
//! exactly once and a replayed token fails.

use std::collections::HashMap;

use chrono::Utc;
use tokio::sync::RwLock;

struct Session {
    email: String,
    /// UTC Unix timestamp after which the session is dead.
    expires_at: i64,
}

/// Active refresh sessions for all signed-in accounts.
#[derive(Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, Session>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a refresh session under its token hash.
    pub async fn insert(&self, token_hash: String, email: String, expiry_days: i64) {
        let expires_at = Utc::now().timestamp() + expiry_days * 24 * 60 * 60;
        self.sessions
            .write()
            .await
            .insert(token_hash, Session { email, expires_at });
    }

    /// Redeem a refresh session, returning the account email.
    ///
    /// The entry is removed whether or not it is still valid, so a presented
    /// token can never be replayed. Expired sessions return `None`.
    pub async fn consume(&self, token_hash: &str) -> Option<String> {
        let session = self.sessions.write().await.remove(token_hash)?;
        if session.expires_at < Utc::now().timestamp() {
            return None;
        }
        Some(session.email)
    }

    /// Drop every session belonging to `email`. Returns how many were removed.
    pub async fn revoke_all_for(&self, email: &str) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, s| s.email != email);
        before - sessions.len()
    }
}
