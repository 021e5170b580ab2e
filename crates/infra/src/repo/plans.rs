//! Plans repository.

use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use vitrina_core::PlanId;
use vitrina_subscriptions::{Entitlements, Plan};

use crate::error::StoreResult;

const SELECT_COLS: &str = "id, code, name, price, currency, max_listings, max_properties, \
     featured, analytics, priority_support, active, created_at";

pub async fn insert(pool: &PgPool, plan: &Plan) -> StoreResult<()> {
    sqlx::query(
        "INSERT INTO plans (id, code, name, price, currency, max_listings, max_properties, \
         featured, analytics, priority_support, active, created_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
    )
    .bind(plan.id.as_uuid())
    .bind(&plan.code)
    .bind(&plan.name)
    .bind(plan.price)
    .bind(&plan.currency)
    .bind(plan.entitlements.max_listings)
    .bind(plan.entitlements.max_properties)
    .bind(plan.entitlements.featured)
    .bind(plan.entitlements.analytics)
    .bind(plan.entitlements.priority_support)
    .bind(plan.active)
    .bind(plan.created_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn fetch(pool: &PgPool, id: PlanId) -> StoreResult<Option<Plan>> {
    let row = sqlx::query(&format!("SELECT {SELECT_COLS} FROM plans WHERE id = $1"))
        .bind(id.as_uuid())
        .fetch_optional(pool)
        .await?;
    row.as_ref().map(row_to_plan).transpose()
}

/// Public plan list: active only, cheapest first.
pub async fn list_active(pool: &PgPool) -> StoreResult<Vec<Plan>> {
    let rows = sqlx::query(&format!(
        "SELECT {SELECT_COLS} FROM plans WHERE active ORDER BY price"
    ))
    .fetch_all(pool)
    .await?;
    rows.iter().map(row_to_plan).collect()
}

/// Admin patch of price/name/limits/flags; `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct PlanPatch {
    pub name: Option<String>,
    pub price: Option<i64>,
    pub max_listings: Option<i64>,
    pub max_properties: Option<i64>,
    pub featured: Option<bool>,
    pub analytics: Option<bool>,
    pub priority_support: Option<bool>,
    pub active: Option<bool>,
}

pub async fn patch(pool: &PgPool, id: PlanId, patch: &PlanPatch) -> StoreResult<Option<Plan>> {
    let row = sqlx::query(&format!(
        "UPDATE plans SET \
         name = COALESCE($1, name), \
         price = COALESCE($2, price), \
         max_listings = COALESCE($3, max_listings), \
         max_properties = COALESCE($4, max_properties), \
         featured = COALESCE($5, featured), \
         analytics = COALESCE($6, analytics), \
         priority_support = COALESCE($7, priority_support), \
         active = COALESCE($8, active) \
         WHERE id = $9 RETURNING {SELECT_COLS}"
    ))
    .bind(&patch.name)
    .bind(patch.price)
    .bind(patch.max_listings)
    .bind(patch.max_properties)
    .bind(patch.featured)
    .bind(patch.analytics)
    .bind(patch.priority_support)
    .bind(patch.active)
    .bind(id.as_uuid())
    .fetch_optional(pool)
    .await?;
    row.as_ref().map(row_to_plan).transpose()
}

fn row_to_plan(row: &PgRow) -> StoreResult<Plan> {
    Ok(Plan {
        id: PlanId::from_uuid(row.try_get::<Uuid, _>("id")?),
        code: row.try_get("code")?,
        name: row.try_get("name")?,
        price: row.try_get("price")?,
        currency: row.try_get("currency")?,
        entitlements: Entitlements {
            max_listings: row.try_get("max_listings")?,
            max_properties: row.try_get("max_properties")?,
            featured: row.try_get("featured")?,
            analytics: row.try_get("analytics")?,
            priority_support: row.try_get("priority_support")?,
        },
        active: row.try_get("active")?,
        created_at: row.try_get("created_at")?,
    })
}
