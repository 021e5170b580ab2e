use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use vitrina_core::{SessionId, TenantId, UserId};

use crate::Role;

/// Length of the random part of a session token.
const TOKEN_LEN: usize = 32;

/// A freshly minted session token.
///
/// The clear-text `token` travels to the client exactly once (cookie or JSON
/// body); only the `digest` is ever persisted, so a leaked sessions table
/// cannot be replayed.
#[derive(Debug, Clone)]
pub struct SessionToken {
    pub token: String,
    pub digest: String,
}

impl SessionToken {
    pub fn generate() -> Self {
        let token = nanoid::nanoid!(TOKEN_LEN);
        let digest = digest_token(&token);
        Self { token, digest }
    }
}

/// SHA-256 hex digest of a clear-text session token.
pub fn digest_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Resolved session row, as loaded by the session-lookup helper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub session_id: SessionId,
    pub user_id: UserId,
    pub tenant_id: TenantId,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionValidationError {
    #[error("session has expired")]
    Expired,

    #[error("invalid session time window (expires_at <= created_at)")]
    InvalidTimeWindow,
}

/// Deterministically validate a resolved session against `now`.
///
/// Note: this validates the *claims* only. Token digest lookup is
/// intentionally outside this crate.
pub fn validate_session(
    claims: &SessionClaims,
    now: DateTime<Utc>,
) -> Result<(), SessionValidationError> {
    if claims.expires_at <= claims.created_at {
        return Err(SessionValidationError::InvalidTimeWindow);
    }
    if now >= claims.expires_at {
        return Err(SessionValidationError::Expired);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn claims(created: DateTime<Utc>, expires: DateTime<Utc>) -> SessionClaims {
        SessionClaims {
            session_id: SessionId::new(),
            user_id: UserId::new(),
            tenant_id: TenantId::new(),
            role: Role::user(),
            created_at: created,
            expires_at: expires,
        }
    }

    #[test]
    fn token_digest_is_stable_and_distinct() {
        let t = SessionToken::generate();
        assert_eq!(t.digest, digest_token(&t.token));
        assert_ne!(t.token, t.digest);
        assert_eq!(t.token.len(), TOKEN_LEN);
    }

    #[test]
    fn live_session_validates() {
        let now = Utc::now();
        let c = claims(now - Duration::hours(1), now + Duration::hours(1));
        assert!(validate_session(&c, now).is_ok());
    }

    #[test]
    fn expired_session_is_rejected() {
        let now = Utc::now();
        let c = claims(now - Duration::hours(2), now - Duration::hours(1));
        assert_eq!(
            validate_session(&c, now),
            Err(SessionValidationError::Expired)
        );
    }

    #[test]
    fn inverted_window_is_rejected() {
        let now = Utc::now();
        let c = claims(now, now - Duration::seconds(1));
        assert_eq!(
            validate_session(&c, now),
            Err(SessionValidationError::InvalidTimeWindow)
        );
    }
}
