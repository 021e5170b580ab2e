//! Sessions repository: the session-lookup helper behind the auth middleware.

use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};
use uuid::Uuid;

use vitrina_auth::{Role, SessionClaims};
use vitrina_core::{SessionId, TenantId, UserId};

use crate::error::StoreResult;

pub async fn insert(
    pool: &PgPool,
    id: SessionId,
    user_id: UserId,
    token_digest: &str,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
) -> StoreResult<()> {
    sqlx::query(
        "INSERT INTO sessions (id, user_id, token_digest, created_at, expires_at) \
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(id.as_uuid())
    .bind(user_id.as_uuid())
    .bind(token_digest)
    .bind(created_at)
    .bind(expires_at)
    .execute(pool)
    .await?;
    Ok(())
}

/// Resolve a token digest to session claims, joining the user row for the
/// role and tenant. Inactive users resolve to nothing.
pub async fn find_by_digest(
    pool: &PgPool,
    token_digest: &str,
) -> StoreResult<Option<SessionClaims>> {
    let row = sqlx::query(
        "SELECT s.id, s.user_id, s.created_at, s.expires_at, u.tenant_id, u.role \
         FROM sessions s JOIN users u ON u.id = s.user_id \
         WHERE s.token_digest = $1 AND u.active",
    )
    .bind(token_digest)
    .fetch_optional(pool)
    .await?;

    row.map(|row| {
        let role: String = row.try_get("role")?;
        Ok(SessionClaims {
            session_id: SessionId::from_uuid(row.try_get::<Uuid, _>("id")?),
            user_id: UserId::from_uuid(row.try_get::<Uuid, _>("user_id")?),
            tenant_id: TenantId::from_uuid(row.try_get::<Uuid, _>("tenant_id")?),
            role: Role::new(role),
            created_at: row.try_get("created_at")?,
            expires_at: row.try_get("expires_at")?,
        })
    })
    .transpose()
}

/// Logout: drop the session row. Missing rows are fine (already logged out).
pub async fn delete_by_digest(pool: &PgPool, token_digest: &str) -> StoreResult<u64> {
    let res = sqlx::query("DELETE FROM sessions WHERE token_digest = $1")
        .bind(token_digest)
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}
