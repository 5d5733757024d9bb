//! Credential hashing for stored users.
//!
//! # Invariants
//! - Hashes are Argon2id PHC strings with a fresh random salt.
//! - Plaintext secrets are never written to the table store.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHasher, SaltString};
use argon2::Argon2;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialError(String);

impl Display for CredentialError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "credential hashing failed: {}", self.0)
    }
}

impl Error for CredentialError {}

impl From<argon2::password_hash::Error> for CredentialError {
    fn from(value: argon2::password_hash::Error) -> Self {
        Self(value.to_string())
    }
}

/// Hashes a plaintext secret into a PHC string.
pub fn hash_secret(secret: &str) -> Result<String, CredentialError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(secret.as_bytes(), &salt)?;
    Ok(hash.to_string())
}
