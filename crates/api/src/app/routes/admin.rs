//! Back-office surface, nested under `/admin` behind the role gate.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::{Duration, Utc};
use serde::Deserialize;

use vitrina_auth::Role;
use vitrina_core::{Page, PageQuery, PlanId, SubscriptionId, TenantId, UserId};
use vitrina_infra::repo::{
    leads, plans,
    plans::PlanPatch,
    stats, subscriptions, users,
};
use vitrina_leads::{LeadFlow, LeadStatus};
use vitrina_subscriptions::{
    Entitlements, PaymentStatus, Plan, Subscription, SubscriptionStatus,
};

use crate::app::{dto, errors, services::AppServices};

pub fn router() -> Router {
    Router::new()
        .route("/stats", get(stats_snapshot))
        .route("/users", get(list_users))
        .route("/users/:id", axum::routing::patch(patch_user))
        .route("/leads", get(list_leads))
        .route("/plans", post(create_plan))
        .route("/plans/:id", axum::routing::patch(patch_plan))
        .route("/subscriptions", post(grant_subscription))
        .route(
            "/subscriptions/:id",
            axum::routing::patch(patch_subscription),
        )
}

/// GET /admin/stats.
async fn stats_snapshot(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match stats::collect(&services.pool).await {
        Ok(snapshot) => (StatusCode::OK, Json(snapshot)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    limit: Option<i64>,
    offset: Option<i64>,
}

/// GET /admin/users.
async fn list_users(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<ListQuery>,
) -> axum::response::Response {
    let page = PageQuery {
        limit: query.limit,
        offset: query.offset,
    };
    match users::list(&services.pool, page).await {
        Ok((items, total)) => {
            let (limit, offset) = page.normalize();
            let items = items.iter().map(dto::user_to_json).collect();
            (StatusCode::OK, Json(Page::new(items, total, limit, offset))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

/// PATCH /admin/users/{id} — role and/or active flag.
async fn patch_user(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::PatchUserRequest>,
) -> axum::response::Response {
    let id = match parse::<UserId>(&id, "invalid user id") {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let role = match body.role.as_deref().map(parse_role).transpose() {
        Ok(role) => role,
        Err(resp) => return resp,
    };

    match users::patch(&services.pool, id, role.as_ref(), body.active, Utc::now()).await {
        Ok(Some(user)) => (StatusCode::OK, Json(dto::user_to_json(&user))).into_response(),
        Ok(None) => errors::hidden_not_found(),
        Err(e) => errors::store_error_to_response(e),
    }
}

#[derive(Debug, Deserialize)]
struct LeadListQuery {
    tenant_id: Option<TenantId>,
    flow: Option<String>,
    status: Option<String>,
    limit: Option<i64>,
    offset: Option<i64>,
}

/// GET /admin/leads — every lead, filterable by tenant/flow/status.
async fn list_leads(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<LeadListQuery>,
) -> axum::response::Response {
    let flow = match query.flow.as_deref().map(LeadFlow::parse).transpose() {
        Ok(flow) => flow,
        Err(e) => return errors::domain_error_to_response(e),
    };
    let status = match query.status.as_deref().map(LeadStatus::parse).transpose() {
        Ok(status) => status,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let filter = leads::LeadFilter {
        tenant_id: query.tenant_id,
        flow,
        status,
    };
    let page = PageQuery {
        limit: query.limit,
        offset: query.offset,
    };

    match leads::list(&services.pool, &filter, page).await {
        Ok((items, total)) => {
            let (limit, offset) = page.normalize();
            let items = items.iter().map(|lead| dto::lead_to_json(lead, &[])).collect();
            (StatusCode::OK, Json(Page::new(items, total, limit, offset))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

/// POST /admin/plans.
async fn create_plan(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CreatePlanRequest>,
) -> axum::response::Response {
    let entitlements = Entitlements {
        max_listings: body.max_listings,
        max_properties: body.max_properties,
        featured: body.featured,
        analytics: body.analytics,
        priority_support: body.priority_support,
    };
    if let Err(e) = Plan::validate(&body.code, &body.name, body.price, &entitlements) {
        return errors::domain_error_to_response(e);
    }

    let plan = Plan {
        id: PlanId::new(),
        code: body.code,
        name: body.name,
        price: body.price,
        currency: body.currency.to_ascii_uppercase(),
        entitlements,
        active: true,
        created_at: Utc::now(),
    };
    if let Err(e) = plans::insert(&services.pool, &plan).await {
        return errors::store_error_to_response(e);
    }

    tracing::info!(plan = %plan.code, "plan created");
    (StatusCode::CREATED, Json(dto::plan_to_json(&plan))).into_response()
}

/// PATCH /admin/plans/{id}.
async fn patch_plan(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::PatchPlanRequest>,
) -> axum::response::Response {
    let id = match parse::<PlanId>(&id, "invalid plan id") {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    if matches!(body.price, Some(p) if p < 0)
        || matches!(body.max_listings, Some(n) if n < 0)
        || matches!(body.max_properties, Some(n) if n < 0)
    {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "price and limits must not be negative",
        );
    }

    let patch = PlanPatch {
        name: body.name,
        price: body.price,
        max_listings: body.max_listings,
        max_properties: body.max_properties,
        featured: body.featured,
        analytics: body.analytics,
        priority_support: body.priority_support,
        active: body.active,
    };
    match plans::patch(&services.pool, id, &patch).await {
        Ok(Some(plan)) => (StatusCode::OK, Json(dto::plan_to_json(&plan))).into_response(),
        Ok(None) => errors::hidden_not_found(),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// POST /admin/subscriptions — grant a plan to a user for a period.
async fn grant_subscription(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::GrantSubscriptionRequest>,
) -> axum::response::Response {
    let user_id = match parse::<UserId>(&body.user_id, "invalid user id") {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let plan_id = match parse::<PlanId>(&body.plan_id, "invalid plan id") {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let payment_status = match body
        .payment_status
        .as_deref()
        .map(PaymentStatus::parse)
        .transpose()
    {
        Ok(status) => status.unwrap_or(PaymentStatus::Paid),
        Err(e) => return errors::domain_error_to_response(e),
    };
    let period_days = body.period_days.unwrap_or(30);
    if !(1..=3660).contains(&period_days) {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "period_days must be between 1 and 3660",
        );
    }

    match users::fetch(&services.pool, user_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return errors::json_error(StatusCode::NOT_FOUND, "not_found", "unknown user"),
        Err(e) => return errors::store_error_to_response(e),
    }
    match plans::fetch(&services.pool, plan_id).await {
        Ok(Some(_)) => {}
        Ok(None) => return errors::json_error(StatusCode::NOT_FOUND, "not_found", "unknown plan"),
        Err(e) => return errors::store_error_to_response(e),
    }

    let now = Utc::now();
    let sub = Subscription {
        id: SubscriptionId::new(),
        user_id,
        plan_id,
        status: SubscriptionStatus::Active,
        payment_status,
        period_start: now,
        period_end: now + Duration::days(period_days),
        created_at: now,
        updated_at: now,
    };
    if let Err(e) = subscriptions::insert(&services.pool, &sub).await {
        return errors::store_error_to_response(e);
    }

    tracing::info!(subscription_id = %sub.id, user_id = %user_id, "subscription granted");
    (StatusCode::CREATED, Json(dto::subscription_to_json(&sub))).into_response()
}

/// PATCH /admin/subscriptions/{id} — status and/or payment status.
async fn patch_subscription(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::PatchSubscriptionRequest>,
) -> axum::response::Response {
    let id = match parse::<SubscriptionId>(&id, "invalid subscription id") {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    let status = match body
        .status
        .as_deref()
        .map(SubscriptionStatus::parse)
        .transpose()
    {
        Ok(status) => status,
        Err(e) => return errors::domain_error_to_response(e),
    };
    let payment_status = match body
        .payment_status
        .as_deref()
        .map(PaymentStatus::parse)
        .transpose()
    {
        Ok(status) => status,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match subscriptions::patch_status(&services.pool, id, status, payment_status, Utc::now()).await
    {
        Ok(Some(sub)) => (StatusCode::OK, Json(dto::subscription_to_json(&sub))).into_response(),
        Ok(None) => errors::hidden_not_found(),
        Err(e) => errors::store_error_to_response(e),
    }
}

fn parse<T: std::str::FromStr>(
    raw: &str,
    message: &'static str,
) -> Result<T, axum::response::Response> {
    raw.parse::<T>()
        .map_err(|_| errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", message))
}

fn parse_role(raw: &str) -> Result<Role, axum::response::Response> {
    match raw {
        "user" => Ok(Role::user()),
        "agency" => Ok(Role::agency()),
        "admin" => Ok(Role::admin()),
        other => Err(errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            format!("unknown role '{other}'"),
        )),
    }
}
