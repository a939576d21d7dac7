//! Password-reset token generation and digesting.
//!
//! The token handed to the user is 32 random bytes, hex-encoded. Storage
//! only ever sees its SHA-256 digest: deterministic, so confirmation can
//! look the account up by digest, and one-way, so a stolen database does
//! not yield usable reset tokens.

use sha2::{Digest, Sha256};

/// Generates a high-entropy reset token (64 hex chars).
pub fn generate_token() -> String {
    use argon2::password_hash::rand_core::{OsRng, RngCore};

    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// The storable digest of a reset token.
pub fn digest(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}
