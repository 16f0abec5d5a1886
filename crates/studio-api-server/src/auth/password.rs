//! bcrypt hashing, always off the async runtime.

use thiserror::Error;
use tracing::warn;

use crate::utils::error::ApiError;

#[derive(Error, Debug)]
pub enum PasswordError {
    #[error("Password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),
    #[error("Password task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub async fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let password = password.to_string();
        let cost = self.cost;

        let hash = tokio::task::spawn_blocking(move || bcrypt::hash(password, cost)).await??;
        Ok(hash)
    }

    /// A malformed stored hash verifies as `false`.
    pub async fn verify(&self, password: &str, stored_hash: &str) -> Result<bool, PasswordError> {
        let password = password.to_string();
        let stored_hash = stored_hash.to_string();

        let valid = tokio::task::spawn_blocking(move || match bcrypt::verify(password, &stored_hash) {
            Ok(valid) => valid,
            Err(e) => {
                warn!("Stored password hash could not be verified: {}", e);
                false
            }
        })
        .await?;

        Ok(valid)
    }
}
