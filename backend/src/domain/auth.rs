//! Password hashing and credential checks.
//!
//! Hashes are Argon2id in PHC string format, stored verbatim in
//! `users.password_hash`. Verification failures never distinguish "no such
//! user" from "wrong password" at the HTTP boundary.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;

use crate::domain::Error;

/// Hash a plaintext password for storage.
///
/// # Errors
///
/// Returns an internal error when hashing fails (out of memory, bad
/// parameters); never exposes the plaintext in the message.
pub fn hash_password(password: &str) -> Result<String, Error> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| Error::internal(format!("password hashing failed: {err}")))
}

/// Verify a plaintext password against a stored PHC hash.
///
/// Returns `Ok(false)` for a mismatch and an error only when the stored
/// hash itself cannot be parsed.
pub fn verify_password(stored_hash: &str, password: &str) -> Result<bool, Error> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|err| Error::internal(format!("stored password hash is invalid: {err}")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}
