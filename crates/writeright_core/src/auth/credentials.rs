//! Argon2id password hashes stored as PHC strings.

use argon2::password_hash::{
    Error as HashError, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
};
use argon2::Argon2;
use rand::RngCore;

const SALT_BYTES: usize = 16;

/// Hashes `password` with a fresh random salt.
///
/// The returned PHC string carries algorithm, cost parameters and salt, so it
/// is the only value that needs storing.
pub fn hash_password(password: &str) -> Result<String, HashError> {
    let mut salt_bytes = [0_u8; SALT_BYTES];
    rand::thread_rng().fill_bytes(&mut salt_bytes);
    let salt = SaltString::encode_b64(&salt_bytes)?;

    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Checks `password` against a stored PHC string.
///
/// `Ok(false)` means the password does not match. An unparseable stored hash
/// is an error.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool, HashError> {
    let parsed = PasswordHash::new(stored_hash)?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(HashError::Password) => Ok(false),
        Err(err) => Err(err),
    }
}
