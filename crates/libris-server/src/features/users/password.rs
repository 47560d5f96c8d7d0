//! Argon2id password hashing
//!
//! Hashes are PHC strings, so the parameters travel with each hash.
//! Both operations are CPU-bound; async callers run them on the blocking
//! pool through [`hash_blocking`] and [`verify_blocking`].

use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString,
    },
    Argon2,
};

use super::UserError;

pub fn hash_password(password: &str) -> Result<String, UserError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| UserError::Hashing(e.to_string()))?;
    Ok(hash.to_string())
}

/// `Ok(false)` for a wrong password, `Err` for an unreadable hash
pub fn verify_password(password: &str, hash: &str) -> Result<bool, UserError> {
    let parsed = PasswordHash::new(hash).map_err(|e| UserError::Hashing(e.to_string()))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(UserError::Hashing(e.to_string())),
    }
}

pub async fn hash_blocking(password: String) -> Result<String, UserError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| UserError::Hashing(e.to_string()))?
}

pub async fn verify_blocking(password: String, hash: String) -> Result<bool, UserError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| UserError::Hashing(e.to_string()))?
}
