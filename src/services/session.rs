//! Session lifecycle: token generation, the `SessionStore` contract, and the
//! in-memory implementation.
//!
//! ARCHITECTURE
//! ============
//! A session is a server-side snapshot `{id, login, role}` of the user taken
//! at login, addressed by a random token the client holds in a cookie.
//! Sessions expire 24 hours after the last request that touched them; an
//! expired session behaves identically to an absent one. The role in the
//! snapshot is never trusted for authorization (see `routes::auth`), so no
//! rotation happens on privilege change.

use std::collections::HashMap;
use std::fmt::Write;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::services::store::StoreError;

/// Fixed session time-to-live, refreshed on each read.
pub const SESSION_TTL: Duration = Duration::from_secs(24 * 60 * 60);

pub(crate) fn bytes_to_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{b:02x}");
    }
    s
}

/// Generate a cryptographically random 32-byte hex token.
#[must_use]
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    bytes_to_hex(&bytes)
}

/// Identity snapshot carried by a session, taken at login time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: i64,
    pub login: String,
    pub role: String,
}

/// Server-side session storage, keyed by token.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Create an `Active` session for the user and return its token.
    async fn establish(&self, user: SessionUser) -> Result<String, StoreError>;

    /// Look up an `Active` session, refreshing its expiry deadline.
    /// Absent and expired sessions both return `None`.
    async fn read(&self, token: &str) -> Result<Option<SessionUser>, StoreError>;

    /// Drop a session. Idempotent; succeeds even if already absent.
    async fn destroy(&self, token: &str) -> Result<(), StoreError>;
}

// =============================================================================
// IN-MEMORY SESSION STORE
// =============================================================================

/// Volatile session map for no-database mode.
pub struct MemorySessionStore {
    ttl: Duration,
    sessions: Mutex<HashMap<String, (SessionUser, Instant)>>,
}

impl MemorySessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::with_ttl(SESSION_TTL)
    }

    /// Override the TTL. Expiry tests use a short deadline.
    #[must_use]
    pub fn with_ttl(ttl: Duration) -> Self {
        Self { ttl, sessions: Mutex::new(HashMap::new()) }
    }
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn establish(&self, user: SessionUser) -> Result<String, StoreError> {
        let token = generate_token();
        let deadline = Instant::now() + self.ttl;
        let mut sessions = self.sessions.lock().await;
        sessions.insert(token.clone(), (user, deadline));
        Ok(token)
    }

    async fn read(&self, token: &str) -> Result<Option<SessionUser>, StoreError> {
        let mut sessions = self.sessions.lock().await;
        let Some((user, deadline)) = sessions.get_mut(token) else {
            return Ok(None);
        };
        if *deadline <= Instant::now() {
            sessions.remove(token);
            return Ok(None);
        }
        *deadline = Instant::now() + self.ttl;
        Ok(Some(user.clone()))
    }

    async fn destroy(&self, token: &str) -> Result<(), StoreError> {
        let mut sessions = self.sessions.lock().await;
        sessions.remove(token);
        Ok(())
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
