//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! Both storage modes hide behind the `UserStore`/`SessionStore` traits, so
//! the auth gate and every handler run unmodified whether a database is
//! configured or not.

use std::sync::Arc;

use sqlx::PgPool;

use crate::services::pg_session::PgSessionStore;
use crate::services::pg_store::PgStore;
use crate::services::session::{MemorySessionStore, SessionStore};
use crate::services::store::{MemoryStore, UserStore};

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; the stores are Arc-wrapped.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub sessions: Arc<dyn SessionStore>,
}

impl AppState {
    /// Postgres-backed mode: hashed credentials, sessions in the database.
    #[must_use]
    pub fn persistent(pool: PgPool) -> Self {
        Self {
            users: Arc::new(PgStore::new(pool.clone())),
            sessions: Arc::new(PgSessionStore::new(pool)),
        }
    }

    /// No-database mode: volatile stores with the dev fixture accounts.
    #[must_use]
    pub fn memory() -> Self {
        Self {
            users: Arc::new(MemoryStore::with_dev_fixtures()),
            sessions: Arc::new(MemorySessionStore::new()),
        }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================

#[cfg(test)]
pub mod test_helpers {
    use super::*;

    /// Memory-mode `AppState` with the dev fixture accounts.
    #[must_use]
    pub fn test_app_state() -> AppState {
        AppState::memory()
    }

    /// Memory-mode `AppState` that also hands back the concrete stores, for
    /// tests that mutate records or expire sessions directly.
    #[must_use]
    pub fn test_app_state_with_stores() -> (AppState, Arc<MemoryStore>, Arc<MemorySessionStore>) {
        let users = Arc::new(MemoryStore::with_dev_fixtures());
        let sessions = Arc::new(MemorySessionStore::new());
        let state = AppState { users: users.clone(), sessions: sessions.clone() };
        (state, users, sessions)
    }
}
