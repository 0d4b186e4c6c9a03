//! Postgres-backed session store.
//!
//! Sessions live in a `sessions` table keyed by token with an `expires_at`
//! column. `read` refreshes the deadline and filters out expired rows in
//! one statement, so an expired session is indistinguishable from an absent
//! one; stale rows are swept opportunistically on establish.

use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::{PgPool, Row};

use crate::services::session::{SessionStore, SessionUser, generate_token};
use crate::services::store::StoreError;

/// Persistent `SessionStore` over the `sessions` table.
pub struct PgSessionStore {
    pool: PgPool,
}

impl PgSessionStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for PgSessionStore {
    async fn establish(&self, user: SessionUser) -> Result<String, StoreError> {
        sqlx::query("DELETE FROM sessions WHERE expires_at <= now()")
            .execute(&self.pool)
            .await?;

        let token = generate_token();
        sqlx::query("INSERT INTO sessions (token, user_snapshot) VALUES ($1, $2)")
            .bind(&token)
            .bind(Json(&user))
            .execute(&self.pool)
            .await?;
        Ok(token)
    }

    async fn read(&self, token: &str) -> Result<Option<SessionUser>, StoreError> {
        let row = sqlx::query(
            r"UPDATE sessions
              SET expires_at = now() + interval '24 hours'
              WHERE token = $1 AND expires_at > now()
              RETURNING user_snapshot",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.get::<Json<SessionUser>, _>("user_snapshot").0))
    }

    async fn destroy(&self, token: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM sessions WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
