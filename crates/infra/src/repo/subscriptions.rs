//! Subscriptions repository.

use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use vitrina_core::{PlanId, SubscriptionId, UserId};
use vitrina_subscriptions::{Entitlements, PaymentStatus, Subscription, SubscriptionStatus};

use crate::error::{StoreError, StoreResult};

const SELECT_COLS: &str =
    "id, user_id, plan_id, status, payment_status, period_start, period_end, created_at, updated_at";

pub async fn insert(pool: &PgPool, sub: &Subscription) -> StoreResult<()> {
    sqlx::query(
        "INSERT INTO subscriptions (id, user_id, plan_id, status, payment_status, period_start, \
         period_end, created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
    )
    .bind(sub.id.as_uuid())
    .bind(sub.user_id.as_uuid())
    .bind(sub.plan_id.as_uuid())
    .bind(sub.status.as_str())
    .bind(sub.payment_status.as_str())
    .bind(sub.period_start)
    .bind(sub.period_end)
    .bind(sub.created_at)
    .bind(sub.updated_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn fetch(pool: &PgPool, id: SubscriptionId) -> StoreResult<Option<Subscription>> {
    let row = sqlx::query(&format!("SELECT {SELECT_COLS} FROM subscriptions WHERE id = $1"))
        .bind(id.as_uuid())
        .fetch_optional(pool)
        .await?;
    row.as_ref().map(row_to_subscription).transpose()
}

/// The user's *effective* subscription: the newest active row whose period
/// covers `now`, joined to its plan's entitlements.
pub async fn effective_for_user(
    pool: &PgPool,
    user_id: UserId,
    now: DateTime<Utc>,
) -> StoreResult<Option<(Subscription, Entitlements)>> {
    let row = sqlx::query(
        "SELECT s.id, s.user_id, s.plan_id, s.status, s.payment_status, s.period_start, \
         s.period_end, s.created_at, s.updated_at, \
         p.max_listings, p.max_properties, p.featured, p.analytics, p.priority_support \
         FROM subscriptions s JOIN plans p ON p.id = s.plan_id \
         WHERE s.user_id = $1 AND s.status = 'active' \
         AND s.period_start <= $2 AND $2 < s.period_end \
         ORDER BY s.created_at DESC LIMIT 1",
    )
    .bind(user_id.as_uuid())
    .bind(now)
    .fetch_optional(pool)
    .await?;

    row.as_ref()
        .map(|row| {
            let sub = row_to_subscription(row)?;
            let entitlements = Entitlements {
                max_listings: row.try_get("max_listings")?,
                max_properties: row.try_get("max_properties")?,
                featured: row.try_get("featured")?,
                analytics: row.try_get("analytics")?,
                priority_support: row.try_get("priority_support")?,
            };
            Ok((sub, entitlements))
        })
        .transpose()
}

/// Newest subscription row regardless of status (payment-status lookup).
pub async fn newest_for_user(pool: &PgPool, user_id: UserId) -> StoreResult<Option<Subscription>> {
    let row = sqlx::query(&format!(
        "SELECT {SELECT_COLS} FROM subscriptions WHERE user_id = $1 \
         ORDER BY created_at DESC LIMIT 1"
    ))
    .bind(user_id.as_uuid())
    .fetch_optional(pool)
    .await?;
    row.as_ref().map(row_to_subscription).transpose()
}

/// Admin patch of status / payment status.
pub async fn patch_status(
    pool: &PgPool,
    id: SubscriptionId,
    status: Option<SubscriptionStatus>,
    payment_status: Option<PaymentStatus>,
    now: DateTime<Utc>,
) -> StoreResult<Option<Subscription>> {
    let row = sqlx::query(&format!(
        "UPDATE subscriptions SET \
         status = COALESCE($1, status), \
         payment_status = COALESCE($2, payment_status), \
         updated_at = $3 \
         WHERE id = $4 RETURNING {SELECT_COLS}"
    ))
    .bind(status.map(|s| s.as_str()))
    .bind(payment_status.map(|s| s.as_str()))
    .bind(now)
    .bind(id.as_uuid())
    .fetch_optional(pool)
    .await?;
    row.as_ref().map(row_to_subscription).transpose()
}

fn row_to_subscription(row: &PgRow) -> StoreResult<Subscription> {
    let status: String = row.try_get("status")?;
    let payment_status: String = row.try_get("payment_status")?;
    Ok(Subscription {
        id: SubscriptionId::from_uuid(row.try_get::<Uuid, _>("id")?),
        user_id: UserId::from_uuid(row.try_get::<Uuid, _>("user_id")?),
        plan_id: PlanId::from_uuid(row.try_get::<Uuid, _>("plan_id")?),
        status: SubscriptionStatus::parse(&status)
            .map_err(|e| StoreError::decode(format!("subscription status: {e}")))?,
        payment_status: PaymentStatus::parse(&payment_status)
            .map_err(|e| StoreError::decode(format!("payment status: {e}")))?,
        period_start: row.try_get("period_start")?,
        period_end: row.try_get("period_end")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
