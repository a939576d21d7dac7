//! Password hashing module.
//!
//! Argon2id with per-hash random salts. Hashing and verification are
//! CPU-bound, so the async wrappers run them on tokio's blocking pool
//! rather than on the request path.

use tracing::error;

use crate::error::{EngineError, EngineResult};

/// Salted, cost-factored one-way hashing for credentials.
#[derive(Debug, Clone, Default)]
pub struct PasswordHasher;

impl PasswordHasher {
    pub fn new() -> Self {
        PasswordHasher
    }

    /// Hashes a password on the blocking pool.
    pub async fn hash(&self, password: String) -> EngineResult<String> {
        tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| {
                error!(error = %e, "hashing task failed");
                EngineError::Internal
            })?
    }

    /// Verifies a password against a stored hash on the blocking pool.
    /// A malformed stored hash verifies as false rather than erroring.
    pub async fn verify(&self, password: String, hash: String) -> EngineResult<bool> {
        tokio::task::spawn_blocking(move || verify_password(&password, &hash))
            .await
            .map_err(|e| {
                error!(error = %e, "verification task failed");
                EngineError::Internal
            })
    }

    /// Burns one hashing round without using the result.
    ///
    /// Called on login when the email lookup misses, so a miss costs the
    /// same as a password mismatch and response timing does not reveal
    /// whether an email is registered.
    pub async fn burn(&self, password: String) -> EngineResult<()> {
        self.hash(password).await.map(|_| ())
    }
}

/// Hash a password for storage (PHC string, salt included).
fn hash_password(password: &str) -> EngineResult<String> {
    use argon2::{
        password_hash::{rand_core::OsRng, SaltString},
        Argon2, PasswordHasher,
    };

    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| {
            error!(error = %e, "password hashing failed");
            EngineError::Internal
        })?;

    Ok(hash.to_string())
}

/// Verify a password against its stored PHC hash.
fn verify_password(password: &str, hash: &str) -> bool {
    use argon2::{Argon2, PasswordHash, PasswordVerifier};

    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}
