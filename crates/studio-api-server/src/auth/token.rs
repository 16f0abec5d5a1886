use rand::Rng;

/// 32 random bytes, hex encoded (64 chars).
pub fn generate_session_token() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    hex::encode(bytes)
}

/// CSRF state for the OAuth consent round trip.
pub fn generate_oauth_state() -> String {
    let bytes: [u8; 16] = rand::rng().random();
    hex::encode(bytes)
}
