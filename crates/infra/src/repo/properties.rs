//! Properties repository: direct CRUD over the `properties` table.

use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use uuid::Uuid;

use vitrina_core::{PageQuery, PropertyId, TenantId, UserId};
use vitrina_listings::ListingStatus;
use vitrina_properties::{Deal, Property, PropertyKind, PropertyUpdate};

use crate::error::{StoreError, StoreResult};

const SELECT_COLS: &str = "id, tenant_id, owner_id, title, description, kind, deal, price, \
     currency, area_m2, rooms, floor, address, city, images, status, created_at, updated_at";

/// Browse filter for the public property surface.
#[derive(Debug, Clone, Default)]
pub struct PropertyFilter {
    pub tenant_id: Option<TenantId>,
    pub kind: Option<PropertyKind>,
    pub deal: Option<Deal>,
    pub city: Option<String>,
    pub rooms_min: Option<i32>,
    pub price_min: Option<i64>,
    pub price_max: Option<i64>,
}

pub async fn insert(pool: &PgPool, property: &Property) -> StoreResult<()> {
    sqlx::query(
        "INSERT INTO properties (id, tenant_id, owner_id, title, description, kind, deal, price, \
         currency, area_m2, rooms, floor, address, city, images, status, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)",
    )
    .bind(property.id.as_uuid())
    .bind(property.tenant_id.as_uuid())
    .bind(property.owner_id.as_uuid())
    .bind(&property.title)
    .bind(&property.description)
    .bind(property.kind.as_str())
    .bind(property.deal.as_str())
    .bind(property.price)
    .bind(&property.currency)
    .bind(property.area_m2)
    .bind(property.rooms)
    .bind(property.floor)
    .bind(&property.address)
    .bind(&property.city)
    .bind(serde_json::to_value(&property.images).unwrap_or_default())
    .bind(property.status.as_str())
    .bind(property.created_at)
    .bind(property.updated_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn fetch(pool: &PgPool, id: PropertyId) -> StoreResult<Option<Property>> {
    let row = sqlx::query(&format!("SELECT {SELECT_COLS} FROM properties WHERE id = $1"))
        .bind(id.as_uuid())
        .fetch_optional(pool)
        .await?;
    row.as_ref().map(row_to_property).transpose()
}

/// Public browse: published only, newest first.
pub async fn list_published(
    pool: &PgPool,
    filter: &PropertyFilter,
    page: PageQuery,
) -> StoreResult<(Vec<Property>, i64)> {
    let (limit, offset) = page.normalize();

    let mut qb: QueryBuilder<'_, Postgres> = QueryBuilder::new(format!(
        "SELECT {SELECT_COLS} FROM properties WHERE status = 'published'"
    ));
    push_filter(&mut qb, filter);
    qb.push(" ORDER BY created_at DESC LIMIT ");
    qb.push_bind(limit);
    qb.push(" OFFSET ");
    qb.push_bind(offset);

    let rows = qb.build().fetch_all(pool).await?;
    let items = rows.iter().map(row_to_property).collect::<StoreResult<Vec<_>>>()?;

    let mut qb: QueryBuilder<'_, Postgres> =
        QueryBuilder::new("SELECT COUNT(*) FROM properties WHERE status = 'published'");
    push_filter(&mut qb, filter);
    let total: i64 = qb.build_query_scalar().fetch_one(pool).await?;

    Ok((items, total))
}

pub async fn list_by_owner(pool: &PgPool, owner_id: UserId) -> StoreResult<Vec<Property>> {
    let rows = sqlx::query(&format!(
        "SELECT {SELECT_COLS} FROM properties WHERE owner_id = $1 ORDER BY created_at DESC"
    ))
    .bind(owner_id.as_uuid())
    .fetch_all(pool)
    .await?;
    rows.iter().map(row_to_property).collect()
}

/// Apply a partial update; returns the updated row, `None` if it vanished.
pub async fn update(
    pool: &PgPool,
    id: PropertyId,
    update: &PropertyUpdate,
    now: DateTime<Utc>,
) -> StoreResult<Option<Property>> {
    let mut qb: QueryBuilder<'_, Postgres> = QueryBuilder::new("UPDATE properties SET updated_at = ");
    qb.push_bind(now);
    if let Some(title) = &update.title {
        qb.push(", title = ").push_bind(title);
    }
    if let Some(description) = &update.description {
        qb.push(", description = ").push_bind(description);
    }
    if let Some(kind) = update.kind {
        qb.push(", kind = ").push_bind(kind.as_str());
    }
    if let Some(deal) = update.deal {
        qb.push(", deal = ").push_bind(deal.as_str());
    }
    if let Some(price) = update.price {
        qb.push(", price = ").push_bind(price);
    }
    if let Some(currency) = &update.currency {
        qb.push(", currency = ").push_bind(currency.to_uppercase());
    }
    if let Some(area_m2) = update.area_m2 {
        qb.push(", area_m2 = ").push_bind(area_m2);
    }
    if let Some(rooms) = update.rooms {
        qb.push(", rooms = ").push_bind(rooms);
    }
    if let Some(floor) = update.floor {
        qb.push(", floor = ").push_bind(floor);
    }
    if let Some(address) = &update.address {
        qb.push(", address = ").push_bind(address);
    }
    if let Some(city) = &update.city {
        qb.push(", city = ").push_bind(city);
    }
    if let Some(images) = &update.images {
        qb.push(", images = ")
            .push_bind(serde_json::to_value(images).unwrap_or_default());
    }
    qb.push(" WHERE id = ").push_bind(*id.as_uuid());
    qb.push(format!(" RETURNING {SELECT_COLS}"));

    let row = qb.build().fetch_optional(pool).await?;
    row.as_ref().map(row_to_property).transpose()
}

/// Set the status; bumps `updated_at`. Returns affected row count.
pub async fn set_status(
    pool: &PgPool,
    id: PropertyId,
    status: ListingStatus,
    now: DateTime<Utc>,
) -> StoreResult<u64> {
    let res = sqlx::query("UPDATE properties SET status = $1, updated_at = $2 WHERE id = $3")
        .bind(status.as_str())
        .bind(now)
        .bind(id.as_uuid())
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

pub async fn delete(pool: &PgPool, id: PropertyId) -> StoreResult<u64> {
    let res = sqlx::query("DELETE FROM properties WHERE id = $1")
        .bind(id.as_uuid())
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

/// Non-draft rows held by one owner, checked against the subscription limit.
pub async fn count_published_by_owner(pool: &PgPool, owner_id: UserId) -> StoreResult<i64> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM properties WHERE owner_id = $1 AND status <> 'draft'",
    )
    .bind(owner_id.as_uuid())
    .fetch_one(pool)
    .await?;
    Ok(count)
}

fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &PropertyFilter) {
    if let Some(tenant_id) = filter.tenant_id {
        qb.push(" AND tenant_id = ").push_bind(*tenant_id.as_uuid());
    }
    if let Some(kind) = filter.kind {
        qb.push(" AND kind = ").push_bind(kind.as_str());
    }
    if let Some(deal) = filter.deal {
        qb.push(" AND deal = ").push_bind(deal.as_str());
    }
    if let Some(city) = &filter.city {
        qb.push(" AND city = ").push_bind(city.clone());
    }
    if let Some(rooms_min) = filter.rooms_min {
        qb.push(" AND rooms >= ").push_bind(rooms_min);
    }
    if let Some(price_min) = filter.price_min {
        qb.push(" AND price >= ").push_bind(price_min);
    }
    if let Some(price_max) = filter.price_max {
        qb.push(" AND price <= ").push_bind(price_max);
    }
}

fn row_to_property(row: &PgRow) -> StoreResult<Property> {
    let status: String = row.try_get("status")?;
    let kind: String = row.try_get("kind")?;
    let deal: String = row.try_get("deal")?;
    let images: serde_json::Value = row.try_get("images")?;
    Ok(Property {
        id: PropertyId::from_uuid(row.try_get::<Uuid, _>("id")?),
        tenant_id: TenantId::from_uuid(row.try_get::<Uuid, _>("tenant_id")?),
        owner_id: UserId::from_uuid(row.try_get::<Uuid, _>("owner_id")?),
        title: row.try_get("title")?,
        description: row.try_get("description")?,
        kind: PropertyKind::parse(&kind)
            .map_err(|e| StoreError::decode(format!("property kind: {e}")))?,
        deal: Deal::parse(&deal).map_err(|e| StoreError::decode(format!("property deal: {e}")))?,
        price: row.try_get("price")?,
        currency: row.try_get("currency")?,
        area_m2: row.try_get("area_m2")?,
        rooms: row.try_get("rooms")?,
        floor: row.try_get("floor")?,
        address: row.try_get("address")?,
        city: row.try_get("city")?,
        images: serde_json::from_value(images)
            .map_err(|e| StoreError::decode(format!("property images: {e}")))?,
        status: ListingStatus::parse(&status)
            .map_err(|e| StoreError::decode(format!("property status: {e}")))?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
