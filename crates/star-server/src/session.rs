//! Session keys: generation and extraction from request headers.

use axum::http::HeaderMap;

/// Header carrying the session key in both directions.
pub const SESSION_HEADER: &str = "x-session-key";

/// Generates a fresh session key: 32 random bytes as 64 lowercase hex digits.
pub fn new_session_key() -> String {
    let bytes: [u8; 32] = rand::random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// The session key sent by the client, if any.
///
/// Missing, empty, or non-ASCII header values count as absent.
pub fn session_key(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(SESSION_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|key| !key.is_empty())
}
