//! Database initialization, migrations, and startup seeding.
//!
//! SYSTEM CONTEXT
//! ==============
//! Startup uses this module to create the shared SQLx pool, enforce schema
//! migrations, and seed the two roles plus the bootstrap admin account
//! before the server starts accepting traffic. None of this runs in
//! no-database mode.

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::services::password;
use crate::services::store::{ROLE_ADMIN, ROLE_USER};

const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    Migrate(#[from] sqlx::migrate::MigrateError),
    #[error("password hashing failed: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),
    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

fn db_max_connections() -> u32 {
    std::env::var("DB_MAX_CONNECTIONS")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS)
}

/// Initialize the `PostgreSQL` connection pool and run migrations.
///
/// # Errors
///
/// Returns an error if the connection or migrations fail.
pub async fn init_pool(database_url: &str) -> Result<PgPool, DbError> {
    let pool = PgPoolOptions::new()
        .max_connections(db_max_connections())
        .connect(database_url)
        .await?;

    sqlx::migrate!("src/db/migrations").run(&pool).await?;

    Ok(pool)
}

/// Seed the two roles and the bootstrap `admin`/`admin` account if absent.
/// Idempotent across restarts.
///
/// # Errors
///
/// Returns an error if any seed statement fails.
pub async fn seed(pool: &PgPool) -> Result<(), DbError> {
    for role in [ROLE_ADMIN, ROLE_USER] {
        sqlx::query("INSERT INTO roles (name) VALUES ($1) ON CONFLICT (name) DO NOTHING")
            .bind(role)
            .execute(pool)
            .await?;
    }

    let existing: Option<i64> = sqlx::query_scalar("SELECT id FROM users WHERE login = 'admin'")
        .fetch_optional(pool)
        .await?;
    if existing.is_none() {
        let hash = tokio::task::spawn_blocking(|| password::hash("admin")).await??;
        sqlx::query(
            r"INSERT INTO users (login, password_hash, name, role_id)
              SELECT 'admin', $1, 'Admin', id FROM roles WHERE name = $2",
        )
        .bind(&hash)
        .bind(ROLE_ADMIN)
        .execute(pool)
        .await?;
        tracing::info!("seeded bootstrap admin account (admin/admin)");
    }

    Ok(())
}
