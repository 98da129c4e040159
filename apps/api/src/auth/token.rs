//! Opaque session tokens: base64 of `"{user_id}.{expiry_unix}.{signature}"`,
//! signed with SHA-256 over the payload and the configured secret.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::Utc;
use sha2::{Digest, Sha256};
use thiserror::Error;
use uuid::Uuid;

const TOKEN_TTL_SECS: i64 = 7 * 24 * 60 * 60;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("malformed token")]
    Malformed,

    #[error("invalid signature")]
    BadSignature,

    #[error("token expired")]
    Expired,
}

/// Issues a token for `user_id`, valid for seven days.
pub fn issue(user_id: Uuid, secret: &str) -> String {
    issue_at(user_id, secret, Utc::now().timestamp())
}

fn issue_at(user_id: Uuid, secret: &str, now: i64) -> String {
    let payload = format!("{user_id}.{}", now + TOKEN_TTL_SECS);
    let signature = sign(&payload, secret);
    BASE64.encode(format!("{payload}.{signature}"))
}

/// Verifies a token and returns the user id it was issued for.
pub fn verify(token: &str, secret: &str) -> Result<Uuid, TokenError> {
    verify_at(token, secret, Utc::now().timestamp())
}

fn verify_at(token: &str, secret: &str, now: i64) -> Result<Uuid, TokenError> {
    let decoded = BASE64.decode(token).map_err(|_| TokenError::Malformed)?;
    let decoded = String::from_utf8(decoded).map_err(|_| TokenError::Malformed)?;

    let mut parts = decoded.splitn(3, '.');
    let user_id = parts.next().ok_or(TokenError::Malformed)?;
    let expiry = parts.next().ok_or(TokenError::Malformed)?;
    let signature = parts.next().ok_or(TokenError::Malformed)?;

    let payload = format!("{user_id}.{expiry}");
    if sign(&payload, secret) != signature {
        return Err(TokenError::BadSignature);
    }

    let expires_at: i64 = expiry.parse().map_err(|_| TokenError::Malformed)?;
    if now >= expires_at {
        return Err(TokenError::Expired);
    }

    Uuid::parse_str(user_id).map_err(|_| TokenError::Malformed)
}

fn sign(payload: &str, secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(payload.as_bytes());
    hasher.update(b".");
    hasher.update(secret.as_bytes());
    format!("{:x}", hasher.finalize())
}
