//! Postgres-backed credential store.

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::services::password::{self, Credential};
use crate::services::store::{NewUser, Role, StoreError, UserRecord, UserStore};

/// Persistent `UserStore` over the `users`/`roles` tables.
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn record_from_row(row: &sqlx::postgres::PgRow) -> UserRecord {
    UserRecord {
        id: row.get("id"),
        login: row.get("login"),
        credential: Credential::Hashed(row.get("password_hash")),
        name: row.get("name"),
        phone: row.get("phone"),
        role: row.get("role"),
    }
}

const SELECT_USER: &str = r"SELECT u.id, u.login, u.password_hash, u.name, u.phone, r.name AS role
     FROM users u
     JOIN roles r ON r.id = u.role_id";

#[async_trait]
impl UserStore for PgStore {
    async fn find_by_login(&self, login: &str) -> Result<Option<UserRecord>, StoreError> {
        let row = sqlx::query(&format!("{SELECT_USER} WHERE u.login = $1"))
            .bind(login)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(record_from_row))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<UserRecord>, StoreError> {
        let row = sqlx::query(&format!("{SELECT_USER} WHERE u.id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(record_from_row))
    }

    async fn create(&self, new: NewUser) -> Result<UserRecord, StoreError> {
        if new.login.trim().is_empty() {
            return Err(StoreError::EmptyLogin);
        }

        // The public contract references roles by name; resolve to the row id
        // up front so a bad reference fails before any insert.
        let role_id: Option<i64> = sqlx::query_scalar("SELECT id FROM roles WHERE name = $1")
            .bind(&new.role)
            .fetch_optional(&self.pool)
            .await?;
        let Some(role_id) = role_id else {
            return Err(StoreError::UnknownRole);
        };

        // bcrypt burns ~100ms of CPU; keep it off the async executor.
        let password = new.password.clone();
        let password_hash = tokio::task::spawn_blocking(move || password::hash(&password)).await??;

        let id: i64 = sqlx::query_scalar(
            r"INSERT INTO users (login, password_hash, name, phone, role_id)
              VALUES ($1, $2, $3, $4, $5)
              RETURNING id",
        )
        .bind(&new.login)
        .bind(&password_hash)
        .bind(&new.name)
        .bind(&new.phone)
        .bind(role_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::DuplicateLogin,
            _ => StoreError::Unavailable(e),
        })?;

        Ok(UserRecord {
            id,
            login: new.login,
            credential: Credential::Hashed(password_hash),
            name: new.name,
            phone: new.phone,
            role: new.role,
        })
    }

    async fn list_roles(&self) -> Result<Vec<Role>, StoreError> {
        let rows = sqlx::query("SELECT id, name FROM roles ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows
            .iter()
            .map(|r| Role { id: r.get("id"), name: r.get("name") })
            .collect())
    }
}

#[cfg(test)]
#[path = "pg_store_test.rs"]
mod tests;
