//! Argon2id password hashing and verification.
//!
//! Hashes are stored in PHC string format so the algorithm parameters and
//! salt travel with the hash.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use cnfs_core::error::CoreError;

/// Hash a plaintext password using Argon2id with a random salt.
pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Verify a plaintext password against a stored PHC hash.
///
/// Returns `Ok(true)` on match, `Ok(false)` on mismatch, and `Err` only when
/// the stored hash itself is unreadable.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, argon2::password_hash::Error> {
    let parsed_hash = PasswordHash::new(hash)?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(e),
    }
}

/// Check `password` against `hash`, folding the result into the domain error.
pub fn check_password(password: &str, hash: &str) -> Result<(), CoreError> {
    match verify_password(password, hash) {
        Ok(true) => Ok(()),
        Ok(false) => Err(CoreError::Mismatch),
        Err(e) => Err(CoreError::Internal(format!(
            "stored password hash is unreadable: {e}"
        ))),
    }
}

/// Hash `password`, mapping failure to an internal error.
pub fn hash_for_storage(password: &str) -> Result<String, CoreError> {
    hash_password(password).map_err(|e| CoreError::Internal(format!("password hashing failed: {e}")))
}
