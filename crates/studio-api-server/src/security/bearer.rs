use axum::http::{header::AUTHORIZATION, HeaderMap};
use sha2::{Digest, Sha256};
use tracing::warn;

use crate::config::{ConfigKey, EnvResolver};
use crate::utils::error::ApiError;

/// Token from `Authorization: Bearer <token>`, scheme matched case-insensitively.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?.trim();
    let (scheme, token) = value.split_once(' ')?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }

    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

/// Guard for operator endpoints keyed by a shared secret.
///
/// An unset secret is a configuration error (500); a missing or wrong bearer
/// token is 401.
pub fn require_secret(headers: &HeaderMap, env: &EnvResolver, key: ConfigKey) -> Result<(), ApiError> {
    let expected = env.resolve(key)?;

    let provided = bearer_token(headers)
        .ok_or_else(|| ApiError::Unauthorized("Missing bearer token".to_string()))?;

    if !secrets_match(provided, &expected) {
        warn!("Rejected request with invalid {}", key);
        return Err(ApiError::Unauthorized("Invalid bearer token".to_string()));
    }

    Ok(())
}

/// Compares SHA-256 digests with a full XOR fold, so timing depends on
/// neither the length nor the first differing byte.
fn secrets_match(provided: &str, expected: &str) -> bool {
    let provided = Sha256::digest(provided.as_bytes());
    let expected = Sha256::digest(expected.as_bytes());

    provided
        .iter()
        .zip(expected.iter())
        .fold(0u8, |acc, (a, b)| acc | (a ^ b))
        == 0
}
