//! Argon2id password storage.
//!
//! Stored hashes are PHC strings (`$argon2id$v=19$m=...`), salted per user.

use argon2::{
    Algorithm, Argon2, Params, PasswordHash, Version,
    password_hash::{PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use thiserror::Error;

/// Failures while hashing or checking a user's password.
///
/// A wrong password is not an error; [`verify_password`] returns `Ok(false)`.
#[derive(Debug, Error)]
pub enum PasswordError {
    /// The hasher rejected the input or its parameters.
    #[error("password hashing failed: {0}")]
    Hashing(String),

    /// The stored value is not a PHC string we can verify against.
    #[error("stored password hash is malformed")]
    MalformedHash,
}

fn hasher() -> Argon2<'static> {
    Argon2::new(Algorithm::Argon2id, Version::V0x13, Params::default())
}

/// Hashes `password` with a fresh random salt.
///
/// ```
/// use invoicely_core::auth::hash_password;
///
/// let stored = hash_password("admin123").unwrap();
/// assert!(stored.starts_with("$argon2id$"));
/// ```
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    hasher()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::Hashing(e.to_string()))
}

/// Checks `password` against a stored hash.
///
/// The parameters embedded in the stored hash are used, so hashes written
/// with older settings keep verifying.
pub fn verify_password(password: &str, stored: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(stored).map_err(|_| PasswordError::MalformedHash)?;

    match hasher().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(argon2::password_hash::Error::Algorithm) => Err(PasswordError::MalformedHash),
        Err(e) => Err(PasswordError::Hashing(e.to_string())),
    }
}
