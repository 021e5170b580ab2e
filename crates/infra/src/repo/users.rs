//! Users repository.

use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use vitrina_auth::{Role, UserAccount};
use vitrina_core::{PageQuery, TenantId, UserId};

use crate::error::StoreResult;

const SELECT_COLS: &str =
    "id, tenant_id, email, password_hash, display_name, role, active, created_at, updated_at";

pub async fn insert(pool: &PgPool, user: &UserAccount) -> StoreResult<()> {
    sqlx::query(
        "INSERT INTO users (id, tenant_id, email, password_hash, display_name, role, active, \
         created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
    )
    .bind(user.id.as_uuid())
    .bind(user.tenant_id.as_uuid())
    .bind(&user.email)
    .bind(&user.password_hash)
    .bind(&user.display_name)
    .bind(user.role.as_str())
    .bind(user.active)
    .bind(user.created_at)
    .bind(user.updated_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn fetch(pool: &PgPool, id: UserId) -> StoreResult<Option<UserAccount>> {
    let row = sqlx::query(&format!("SELECT {SELECT_COLS} FROM users WHERE id = $1"))
        .bind(id.as_uuid())
        .fetch_optional(pool)
        .await?;
    row.as_ref().map(row_to_user).transpose()
}

/// Login lookup. `email` must already be normalized (lower-cased).
pub async fn fetch_by_email(
    pool: &PgPool,
    tenant_id: TenantId,
    email: &str,
) -> StoreResult<Option<UserAccount>> {
    let row = sqlx::query(&format!(
        "SELECT {SELECT_COLS} FROM users WHERE tenant_id = $1 AND email = $2"
    ))
    .bind(tenant_id.as_uuid())
    .bind(email)
    .fetch_optional(pool)
    .await?;
    row.as_ref().map(row_to_user).transpose()
}

/// Admin listing, newest first.
pub async fn list(pool: &PgPool, page: PageQuery) -> StoreResult<(Vec<UserAccount>, i64)> {
    let (limit, offset) = page.normalize();
    let rows = sqlx::query(&format!(
        "SELECT {SELECT_COLS} FROM users ORDER BY created_at DESC LIMIT $1 OFFSET $2"
    ))
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;
    let items = rows.iter().map(row_to_user).collect::<StoreResult<Vec<_>>>()?;

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;
    Ok((items, total))
}

/// Admin patch of role / active flag.
pub async fn patch(
    pool: &PgPool,
    id: UserId,
    role: Option<&Role>,
    active: Option<bool>,
    now: chrono::DateTime<chrono::Utc>,
) -> StoreResult<Option<UserAccount>> {
    let row = sqlx::query(&format!(
        "UPDATE users SET role = COALESCE($1, role), active = COALESCE($2, active), \
         updated_at = $3 WHERE id = $4 RETURNING {SELECT_COLS}"
    ))
    .bind(role.map(|r| r.as_str().to_string()))
    .bind(active)
    .bind(now)
    .bind(id.as_uuid())
    .fetch_optional(pool)
    .await?;
    row.as_ref().map(row_to_user).transpose()
}

fn row_to_user(row: &PgRow) -> StoreResult<UserAccount> {
    let role: String = row.try_get("role")?;
    Ok(UserAccount {
        id: UserId::from_uuid(row.try_get::<Uuid, _>("id")?),
        tenant_id: TenantId::from_uuid(row.try_get::<Uuid, _>("tenant_id")?),
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
        display_name: row.try_get("display_name")?,
        role: Role::new(role),
        active: row.try_get("active")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
