//! Credential store abstraction and the in-memory implementation.
//!
//! ARCHITECTURE
//! ============
//! Both storage modes sit behind `UserStore` so the auth gate and route
//! handlers are identical regardless of whether a database is configured.
//! Role references in the public contract are role *names*; the persistent
//! store resolves a name to its row id before insert, the memory store
//! checks its fixed role list. Either way no user is ever stored with a
//! dangling role reference.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::services::password::Credential;

pub const ROLE_ADMIN: &str = "Administrator";
pub const ROLE_USER: &str = "User";

/// Named authorization group. Users reference exactly one.
#[derive(Debug, Clone)]
pub struct Role {
    pub id: i64,
    pub name: String,
}

/// A stored user with its role name resolved.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: i64,
    pub login: String,
    pub credential: Credential,
    pub name: Option<String>,
    pub phone: Option<String>,
    /// Resolved role name, e.g. `"Administrator"`.
    pub role: String,
}

/// Input to `UserStore::create`. Carries the plaintext password; each store
/// decides the credential form (the persistent store hashes, the memory
/// store keeps it as-is).
#[derive(Debug, Clone)]
pub struct NewUser {
    pub login: String,
    pub password: String,
    pub name: Option<String>,
    pub phone: Option<String>,
    /// Role name; must match an existing role.
    pub role: String,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("login must not be empty")]
    EmptyLogin,
    #[error("login already taken")]
    DuplicateLogin,
    #[error("unknown role")]
    UnknownRole,
    #[error("password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),
    #[error("background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
    #[error("store unavailable: {0}")]
    Unavailable(#[from] sqlx::Error),
}

/// Abstraction over persistent or volatile user storage.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_login(&self, login: &str) -> Result<Option<UserRecord>, StoreError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<UserRecord>, StoreError>;
    async fn create(&self, new: NewUser) -> Result<UserRecord, StoreError>;
    async fn list_roles(&self) -> Result<Vec<Role>, StoreError>;
}

// =============================================================================
// IN-MEMORY STORE
// =============================================================================

/// Volatile user list for environments without a database.
///
/// Credentials are plaintext (`Credential::Plain`) and everything is lost on
/// restart. Id assignment and append happen under one write guard so
/// concurrent registrations never hand out the same id.
pub struct MemoryStore {
    users: RwLock<Vec<UserRecord>>,
    roles: Vec<Role>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self {
            users: RwLock::new(Vec::new()),
            roles: vec![
                Role { id: 1, name: ROLE_ADMIN.to_owned() },
                Role { id: 2, name: ROLE_USER.to_owned() },
            ],
        }
    }

    /// Memory store pre-loaded with the dev fixture accounts
    /// (`admin`/`admin` and `user`/`user`).
    #[must_use]
    pub fn with_dev_fixtures() -> Self {
        let mut store = Self::new();
        store.users = RwLock::new(vec![
            UserRecord {
                id: 1,
                login: "admin".to_owned(),
                credential: Credential::Plain("admin".to_owned()),
                name: None,
                phone: None,
                role: ROLE_ADMIN.to_owned(),
            },
            UserRecord {
                id: 2,
                login: "user".to_owned(),
                credential: Credential::Plain("user".to_owned()),
                name: None,
                phone: None,
                role: ROLE_USER.to_owned(),
            },
        ]);
        store
    }

    /// Reassign a user's role in place. Test hook for exercising the
    /// live-record authorization check.
    #[cfg(test)]
    pub async fn set_role(&self, id: i64, role: &str) -> bool {
        let mut users = self.users.write().await;
        match users.iter_mut().find(|u| u.id == id) {
            Some(user) => {
                user.role = role.to_owned();
                true
            }
            None => false,
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_by_login(&self, login: &str) -> Result<Option<UserRecord>, StoreError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.login == login).cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<UserRecord>, StoreError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn create(&self, new: NewUser) -> Result<UserRecord, StoreError> {
        if new.login.trim().is_empty() {
            return Err(StoreError::EmptyLogin);
        }
        if !self.roles.iter().any(|r| r.name == new.role) {
            return Err(StoreError::UnknownRole);
        }

        let mut users = self.users.write().await;
        if users.iter().any(|u| u.login == new.login) {
            return Err(StoreError::DuplicateLogin);
        }

        let id = users.iter().map(|u| u.id).max().unwrap_or(0) + 1;
        let record = UserRecord {
            id,
            login: new.login,
            credential: Credential::Plain(new.password),
            name: new.name,
            phone: new.phone,
            role: new.role,
        };
        users.push(record.clone());
        Ok(record)
    }

    async fn list_roles(&self) -> Result<Vec<Role>, StoreError> {
        Ok(self.roles.clone())
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
