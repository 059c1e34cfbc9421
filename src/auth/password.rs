//! bcrypt runs on the blocking pool; a hash at the default cost takes a few hundred
//! milliseconds of CPU.

use bcrypt::{DEFAULT_COST, hash, verify};
use tokio::task::spawn_blocking;

use super::AuthError;

#[cfg(not(test))]
const COST: u32 = DEFAULT_COST;
// Minimum cost keeps unit tests fast.
#[cfg(test)]
const COST: u32 = 4;

pub async fn hash_password(password: String) -> Result<String, AuthError> {
    spawn_blocking(move || hash(password, COST))
        .await
        .map_err(AuthError::HashingTask)?
        .map_err(AuthError::Hashing)
}

pub async fn verify_password(password: String, password_hash: String) -> Result<bool, AuthError> {
    spawn_blocking(move || verify(password, &password_hash))
        .await
        .map_err(AuthError::HashingTask)?
        .map_err(AuthError::Hashing)
}
