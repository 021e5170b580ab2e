//! Admin statistics: one aggregate query per table.

use serde::Serialize;
use sqlx::{PgPool, Row};

use crate::error::StoreResult;

/// Count grouped by a text column (status, flow).
#[derive(Debug, Clone, Serialize)]
pub struct BucketCount {
    pub key: String,
    pub count: i64,
}

/// Snapshot for the admin dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct AdminStats {
    pub users_total: i64,
    pub listings_by_status: Vec<BucketCount>,
    pub properties_by_status: Vec<BucketCount>,
    pub leads_by_flow: Vec<BucketCount>,
    pub leads_by_status: Vec<BucketCount>,
    pub active_subscriptions: i64,
}

pub async fn collect(pool: &PgPool) -> StoreResult<AdminStats> {
    let users_total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;

    let listings_by_status = bucket(pool, "SELECT status AS key, COUNT(*) AS count FROM listings GROUP BY status ORDER BY status").await?;
    let properties_by_status = bucket(pool, "SELECT status AS key, COUNT(*) AS count FROM properties GROUP BY status ORDER BY status").await?;
    let leads_by_flow = bucket(pool, "SELECT flow AS key, COUNT(*) AS count FROM leads GROUP BY flow ORDER BY flow").await?;
    let leads_by_status = bucket(pool, "SELECT status AS key, COUNT(*) AS count FROM leads GROUP BY status ORDER BY status").await?;

    let active_subscriptions: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM subscriptions WHERE status = 'active' \
         AND period_start <= NOW() AND NOW() < period_end",
    )
    .fetch_one(pool)
    .await?;

    Ok(AdminStats {
        users_total,
        listings_by_status,
        properties_by_status,
        leads_by_flow,
        leads_by_status,
        active_subscriptions,
    })
}

async fn bucket(pool: &PgPool, sql: &str) -> StoreResult<Vec<BucketCount>> {
    let rows = sqlx::query(sql).fetch_all(pool).await?;
    rows.iter()
        .map(|row| {
            Ok(BucketCount {
                key: row.try_get("key")?,
                count: row.try_get("count")?,
            })
        })
        .collect()
}
