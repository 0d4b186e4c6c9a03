//! Password hashing and credential verification.
//!
//! TRADE-OFFS
//! ==========
//! The in-memory store keeps plaintext credentials so it can run without a
//! database; `Credential` makes that distinction explicit in the type system
//! and `verify` handles both arms, so the memory fallback can never be
//! confused with a real hash at a call site.

/// Matches the original deployment's bcrypt work factor.
pub const BCRYPT_COST: u32 = 10;

/// A stored password credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credential {
    /// bcrypt hash. Used by the persistent store.
    Hashed(String),
    /// Plaintext. Dev/test-only fallback for the in-memory store; never
    /// produced when a persistent store is configured.
    Plain(String),
}

/// Hash a plaintext password for persistent storage.
///
/// # Errors
///
/// Returns an error if bcrypt rejects the cost parameter or input.
pub fn hash(plaintext: &str) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(plaintext, BCRYPT_COST)
}

/// Check a plaintext password against a stored credential.
///
/// A malformed stored hash counts as a failed match rather than an error;
/// login treats it the same as a wrong password.
#[must_use]
pub fn verify(plaintext: &str, credential: &Credential) -> bool {
    match credential {
        Credential::Hashed(hash) => bcrypt::verify(plaintext, hash).unwrap_or(false),
        Credential::Plain(stored) => plaintext == stored,
    }
}

/// `verify` on the blocking pool; the bcrypt compare costs ~100ms of CPU
/// and must not stall the async executor. A panicked task counts as a
/// failed match.
pub async fn verify_blocking(plaintext: String, credential: Credential) -> bool {
    tokio::task::spawn_blocking(move || verify(&plaintext, &credential))
        .await
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "password_test.rs"]
mod tests;
