//! Leads repository: draft row + incremental step upserts.

use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use uuid::Uuid;

use vitrina_core::{LeadId, PageQuery, PropertyId, TenantId};
use vitrina_leads::{ContactDetails, Lead, LeadFlow, LeadStatus, LeadStep};

use crate::error::{StoreError, StoreResult};

const SELECT_COLS: &str = "id, tenant_id, flow, status, contact_name, contact_email, \
     contact_phone, property_id, created_at, updated_at";

/// Admin listing filter.
#[derive(Debug, Clone, Default)]
pub struct LeadFilter {
    pub tenant_id: Option<TenantId>,
    pub flow: Option<LeadFlow>,
    pub status: Option<LeadStatus>,
}

pub async fn insert(pool: &PgPool, lead: &Lead) -> StoreResult<()> {
    sqlx::query(
        "INSERT INTO leads (id, tenant_id, flow, status, contact_name, contact_email, \
         contact_phone, property_id, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
    )
    .bind(lead.id.as_uuid())
    .bind(lead.tenant_id.as_uuid())
    .bind(lead.flow.as_str())
    .bind(lead.status.as_str())
    .bind(&lead.contact.name)
    .bind(&lead.contact.email)
    .bind(&lead.contact.phone)
    .bind(lead.property_id.map(|p| *p.as_uuid()))
    .bind(lead.created_at)
    .bind(lead.updated_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn fetch(pool: &PgPool, id: LeadId) -> StoreResult<Option<Lead>> {
    let row = sqlx::query(&format!("SELECT {SELECT_COLS} FROM leads WHERE id = $1"))
        .bind(id.as_uuid())
        .fetch_optional(pool)
        .await?;
    row.as_ref().map(row_to_lead).transpose()
}

/// Upsert one wizard step, keyed by (lead, step). Last write wins.
pub async fn upsert_step(pool: &PgPool, step: &LeadStep) -> StoreResult<()> {
    sqlx::query(
        "INSERT INTO lead_steps (lead_id, step_number, payload, submitted_at) \
         VALUES ($1, $2, $3, $4) \
         ON CONFLICT (lead_id, step_number) \
         DO UPDATE SET payload = EXCLUDED.payload, submitted_at = EXCLUDED.submitted_at",
    )
    .bind(step.lead_id.as_uuid())
    .bind(step.step_number)
    .bind(&step.payload)
    .bind(step.submitted_at)
    .execute(pool)
    .await?;
    Ok(())
}

/// All steps last written for a lead, in step order.
pub async fn fetch_steps(pool: &PgPool, id: LeadId) -> StoreResult<Vec<LeadStep>> {
    let rows = sqlx::query(
        "SELECT lead_id, step_number, payload, submitted_at FROM lead_steps \
         WHERE lead_id = $1 ORDER BY step_number",
    )
    .bind(id.as_uuid())
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|row| {
            Ok(LeadStep {
                lead_id: LeadId::from_uuid(row.try_get::<Uuid, _>("lead_id")?),
                step_number: row.try_get("step_number")?,
                payload: row.try_get("payload")?,
                submitted_at: row.try_get("submitted_at")?,
            })
        })
        .collect()
}

/// Refresh the lead's contact columns and bump `updated_at`.
pub async fn update_contact(
    pool: &PgPool,
    id: LeadId,
    contact: &ContactDetails,
    now: DateTime<Utc>,
) -> StoreResult<()> {
    sqlx::query(
        "UPDATE leads SET contact_name = $1, contact_email = $2, contact_phone = $3, \
         updated_at = $4 WHERE id = $5",
    )
    .bind(&contact.name)
    .bind(&contact.email)
    .bind(&contact.phone)
    .bind(now)
    .bind(id.as_uuid())
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn set_status(
    pool: &PgPool,
    id: LeadId,
    status: LeadStatus,
    now: DateTime<Utc>,
) -> StoreResult<u64> {
    let res = sqlx::query("UPDATE leads SET status = $1, updated_at = $2 WHERE id = $3")
        .bind(status.as_str())
        .bind(now)
        .bind(id.as_uuid())
        .execute(pool)
        .await?;
    Ok(res.rows_affected())
}

/// Admin listing, newest first.
pub async fn list(
    pool: &PgPool,
    filter: &LeadFilter,
    page: PageQuery,
) -> StoreResult<(Vec<Lead>, i64)> {
    let (limit, offset) = page.normalize();

    let mut qb: QueryBuilder<'_, Postgres> =
        QueryBuilder::new(format!("SELECT {SELECT_COLS} FROM leads WHERE TRUE"));
    push_filter(&mut qb, filter);
    qb.push(" ORDER BY created_at DESC LIMIT ");
    qb.push_bind(limit);
    qb.push(" OFFSET ");
    qb.push_bind(offset);

    let rows = qb.build().fetch_all(pool).await?;
    let items = rows.iter().map(row_to_lead).collect::<StoreResult<Vec<_>>>()?;

    let mut qb: QueryBuilder<'_, Postgres> =
        QueryBuilder::new("SELECT COUNT(*) FROM leads WHERE TRUE");
    push_filter(&mut qb, filter);
    let total: i64 = qb.build_query_scalar().fetch_one(pool).await?;

    Ok((items, total))
}

fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, filter: &LeadFilter) {
    if let Some(tenant_id) = filter.tenant_id {
        qb.push(" AND tenant_id = ").push_bind(*tenant_id.as_uuid());
    }
    if let Some(flow) = filter.flow {
        qb.push(" AND flow = ").push_bind(flow.as_str());
    }
    if let Some(status) = filter.status {
        qb.push(" AND status = ").push_bind(status.as_str());
    }
}

fn row_to_lead(row: &PgRow) -> StoreResult<Lead> {
    let flow: String = row.try_get("flow")?;
    let status: String = row.try_get("status")?;
    Ok(Lead {
        id: LeadId::from_uuid(row.try_get::<Uuid, _>("id")?),
        tenant_id: TenantId::from_uuid(row.try_get::<Uuid, _>("tenant_id")?),
        flow: LeadFlow::parse(&flow).map_err(|e| StoreError::decode(format!("lead flow: {e}")))?,
        status: LeadStatus::parse(&status)
            .map_err(|e| StoreError::decode(format!("lead status: {e}")))?,
        contact: ContactDetails {
            name: row.try_get("contact_name")?,
            email: row.try_get("contact_email")?,
            phone: row.try_get("contact_phone")?,
        },
        property_id: row
            .try_get::<Option<Uuid>, _>("property_id")?
            .map(PropertyId::from_uuid),
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
