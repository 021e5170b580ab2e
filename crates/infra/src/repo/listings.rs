//! Listings repository: direct CRUD over the `listings` table.

use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use uuid::Uuid;

use vitrina_core::{ListingId, PageQuery, TenantId, UserId};
use vitrina_listings::{Listing, ListingStatus, ListingUpdate};

use crate::error::{StoreError, StoreResult};

const SELECT_COLS: &str = "id, tenant_id, owner_id, title, description, category, price, \
     currency, location, images, status, created_at, updated_at";

/// Browse filter for the public listing surface.
#[derive(Debug, Clone, Default)]
pub struct ListingFilter {
    pub tenant_id: Option<TenantId>,
    pub category: Option<String>,
    pub price_min: Option<i64>,
    pub price_max: Option<i64>,
}

pub async fn insert(pool: &PgPool, listing: &Listing) -> StoreResult<()> {
    sqlx::query(
        "INSERT INTO listings (id, tenant_id, owner_id, title, description, category, price, \
         currency, location, images, status, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
    )
    .bind(listing.id.as_uuid())
    .bind(listing.tenant_id.as_uuid())
    .bind(listing.owner_id.as_uuid())
    .bind(&listing.title)
    .bind(&listing.description)
    .bind(&listing.category)
    .bind(listing.price)
    .bind(&listing.currency)
    .bind(&listing.location)
    .bind(serde_json::to_value(&listing.images).unwrap_or_default())
    .bind(listing.status.as_str())
    .bind(listing.created_at)
    .bind(listing.updated_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn fetch(pool: &PgPool, id: ListingId) -> StoreResult<Option<Listing>> {
    let row = sqlx::query(&format!("SELECT {SELECT_COLS} FROM listings WHERE id = $1"))
        .bind(id.as_uuid())
        .fetch_optional(pool)
        .await?;
    row.as_ref().map(row_to_listing).transpose()
}

/// Public browse: published only, newest first.
pub async fn list_published(
    pool: &PgPool,
    filter: &ListingFilter,
    page: PageQuery,
) -> StoreResult<(Vec<Listing>, i64)> {
    let (limit, offset) = page.normalize();

    let mut qb: QueryBuilder<'_, Postgres> =
        QueryBuilder::new(format!("SELECT {SELECT_COLS} FROM listings WHERE status = 'published'"));
    push_filter(&mut qb, filter);
    qb.push(" ORDER BY created_at DESC LIMIT ");
    qb.push_bind(limit);
    qb.push(" OFFSET ");
    qb.push_bind(offset);

    let rows = qb.build().fetch_all(pool).await?;
    let items = rows.iter().map(row_to_listing).collect::<StoreResult<Vec<_>>>()?;

    let mut qb: QueryBuilder<'_, Postgres> =
        QueryBuilder::new("SELECT COUNT(*) FROM listings WHERE status = 'published'");
    push_filter(&mut qb, filter);
    let total: i64 = qb.build_query_scalar().fetch_one(pool).await?;

    Ok((items, total))
}

pub async fn list_by_owner(pool: &PgPool, owner_id: UserId) -> StoreResult<Vec<Listing>> {
    let rows = sqlx::query(&format!(
        "SELECT {SELECT_COLS} FROM listings WHERE owner_id = $1 ORDER BY created_at DESC"
    ))
    .bind(owner_id.as_uuid())
    .fetch_all(pool)
    .await?;
    rows.iter().map(row_to_listing).collect()
}

/// Apply a partial update; returns the updated row, `None` if it vanished.
pub async fn update(
    pool: &PgPool,
    id: ListingId,
    update: &ListingUpdate,
    now: DateTime<Utc>,
) -> StoreResult<Option<Listing>> {
    let mut qb: QueryBuilder<'_, Postgres> = QueryBuilder::new("UPDATE listings SET updated_at = ");
    qb.push_bind(now);
    if let Some(title) = &update.title {
        qb.push(", title = ").push_bind(title);
    }
    if let Some(description) = &update.description {
        qb.push(", description = ").push_bind(description);
    }
    if let Some(category) = &update.category {
        qb.push(", category = ").push_bind(category);
    }
    if let Some(price) = update.price {
        qb.push(", price = ").push_bind(price);
    }
    if let Some(currency) = &update.currency {
        qb.push(", currency = ").push_bind(currency.to_uppercase());
    }
    if let Some(location) = &update.location {
        qb.push(", location = ").push_bind(location);
    }
    if let Some(images) = &update.images {
        qb.push(", images = ")
            .push_bind(serde_json::to_value(images).unwrap_or_default());
    }
    qb.push(" WHERE id = ").push_bind(*id.as_uuid());
    qb.push(format!(" RETURNING {SELECT_COLS}"));

    let row = qb.build().fetch_optional(pool).await?;
    row.as_ref().map(row_to_listing).transpose()
}

/// Set the status; bumps `updated_at`. Returns affected row count.
pub async fn set_status(
    pool: &PgPool,
    id: ListingId,
    status: ListingStatus,
    now: DateTime<Utc>,
) -> StoreResult<u64> {
    let res = sqlx::query("UPDATE listings SET status = $1, updated_at = $2 WHERE id = $3")
        .bind(status.as_str())
        .bind(now)
        .bind(id.as_uuid())
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

pub async fn delete(pool: &PgPool, id: ListingId) -> StoreResult<u64> {
    let res = sqlx::query("DELETE FROM listings WHERE id = $1")
        .bind(id.as_uuid())
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

/// Non-draft rows held by one owner, checked against the subscription limit.
pub async fn count_published_by_owner(pool: &PgPool, owner_id: UserId) -> StoreResult<i64> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM listings WHERE owner_id = $1 AND status <> 'draft'")
            .bind(owner_id.as_uuid())
            .fetch_one(pool)
            .await?;
    Ok(count)
}

fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &ListingFilter) {
    if let Some(tenant_id) = filter.tenant_id {
        qb.push(" AND tenant_id = ").push_bind(*tenant_id.as_uuid());
    }
    if let Some(category) = &filter.category {
        qb.push(" AND category = ").push_bind(category.clone());
    }
    if let Some(price_min) = filter.price_min {
        qb.push(" AND price >= ").push_bind(price_min);
    }
    if let Some(price_max) = filter.price_max {
        qb.push(" AND price <= ").push_bind(price_max);
    }
}

fn row_to_listing(row: &PgRow) -> StoreResult<Listing> {
    let status: String = row.try_get("status")?;
    let images: serde_json::Value = row.try_get("images")?;
    Ok(Listing {
        id: ListingId::from_uuid(row.try_get::<Uuid, _>("id")?),
        tenant_id: TenantId::from_uuid(row.try_get::<Uuid, _>("tenant_id")?),
        owner_id: UserId::from_uuid(row.try_get::<Uuid, _>("owner_id")?),
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        category: row.try_get("category")?,
        price: row.try_get("price")?,
        currency: row.try_get("currency")?,
        location: row.try_get("location")?,
        images: serde_json::from_value(images)
            .map_err(|e| StoreError::decode(format!("listing images: {e}")))?,
        status: ListingStatus::parse(&status)
            .map_err(|e| StoreError::decode(format!("listing status: {e}")))?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
