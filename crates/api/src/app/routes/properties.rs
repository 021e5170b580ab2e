use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use serde::Deserialize;

use vitrina_core::{Page, PageQuery, PropertyId, TenantId};
use vitrina_infra::repo::properties as repo;
use vitrina_infra::repo::properties::PropertyFilter;
use vitrina_listings::{ListingStatus, PublishOutcome};
use vitrina_properties::{Deal, Property, PropertyDraft, PropertyKind, PropertyUpdate};

use crate::app::routes::subscriptions::entitlements_for;
use crate::app::{dto, errors, services::AppServices};
use crate::context::RequestContext;

#[derive(Debug, Deserialize)]
pub struct BrowseQuery {
    pub kind: Option<String>,
    pub deal: Option<String>,
    pub city: Option<String>,
    pub rooms_min: Option<i32>,
    pub tenant_id: Option<TenantId>,
    pub price_min: Option<i64>,
    pub price_max: Option<i64>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// GET /properties — public browse of published properties.
pub async fn browse(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<BrowseQuery>,
) -> axum::response::Response {
    let kind = match query.kind.as_deref().map(PropertyKind::parse).transpose() {
        Ok(k) => k,
        Err(e) => return errors::domain_error_to_response(e),
    };
    let deal = match query.deal.as_deref().map(Deal::parse).transpose() {
        Ok(d) => d,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let filter = PropertyFilter {
        tenant_id: query.tenant_id,
        kind,
        deal,
        city: query.city,
        rooms_min: query.rooms_min,
        price_min: query.price_min,
        price_max: query.price_max,
    };
    let page = PageQuery {
        limit: query.limit,
        offset: query.offset,
    };

    match repo::list_published(&services.pool, &filter, page).await {
        Ok((items, total)) => {
            let (limit, offset) = page.normalize();
            let items = items.iter().map(dto::property_to_json).collect();
            (StatusCode::OK, Json(Page::new(items, total, limit, offset))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

/// GET /properties/{id} — public fetch; unpublished rows are invisible here.
pub async fn fetch_public(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match repo::fetch(&services.pool, id).await {
        Ok(Some(p)) if p.status == ListingStatus::Published => {
            (StatusCode::OK, Json(dto::property_to_json(&p))).into_response()
        }
        Ok(_) => errors::hidden_not_found(),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// POST /my/properties — create a draft.
pub async fn create(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    Json(body): Json<PropertyDraft>,
) -> axum::response::Response {
    if let Err(resp) = errors::require_permission(&ctx, "properties.write") {
        return resp;
    }
    if let Err(e) = body.validate() {
        return errors::domain_error_to_response(e);
    }

    let property = body.into_property(ctx.tenant_id(), ctx.user_id(), Utc::now());
    if let Err(e) = repo::insert(&services.pool, &property).await {
        return errors::store_error_to_response(e);
    }

    tracing::info!(property_id = %property.id, "property draft created");
    (StatusCode::CREATED, Json(dto::property_to_json(&property))).into_response()
}

/// GET /my/properties.
pub async fn list_mine(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
) -> axum::response::Response {
    match repo::list_by_owner(&services.pool, ctx.user_id()).await {
        Ok(items) => {
            let items = items.iter().map(dto::property_to_json).collect::<Vec<_>>();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

/// GET /my/properties/{id}.
pub async fn fetch_mine(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    match fetch_owned(&services, &ctx, &id).await {
        Ok(p) => (StatusCode::OK, Json(dto::property_to_json(&p))).into_response(),
        Err(resp) => resp,
    }
}

/// PATCH /my/properties/{id}.
pub async fn update(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
    Json(body): Json<PropertyUpdate>,
) -> axum::response::Response {
    if let Err(resp) = errors::require_permission(&ctx, "properties.write") {
        return resp;
    }
    let property = match fetch_owned(&services, &ctx, &id).await {
        Ok(p) => p,
        Err(resp) => return resp,
    };
    if let Err(e) = body.validate() {
        return errors::domain_error_to_response(e);
    }
    if body.is_empty() {
        return errors::json_error(StatusCode::BAD_REQUEST, "validation_error", "empty update");
    }

    match repo::update(&services.pool, property.id, &body, Utc::now()).await {
        Ok(Some(p)) => (StatusCode::OK, Json(dto::property_to_json(&p))).into_response(),
        Ok(None) => errors::hidden_not_found(),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// POST /my/properties/{id}/publish — enforces the subscription limit.
pub async fn publish(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = errors::require_permission(&ctx, "properties.publish") {
        return resp;
    }
    let property = match fetch_owned(&services, &ctx, &id).await {
        Ok(p) => p,
        Err(resp) => return resp,
    };

    let entitlements = match entitlements_for(&services, property.owner_id).await {
        Ok(e) => e,
        Err(e) => return errors::store_error_to_response(e),
    };
    let held = match repo::count_published_by_owner(&services.pool, property.owner_id).await {
        Ok(n) => n,
        Err(e) => return errors::store_error_to_response(e),
    };

    match property.status.publish_outcome(held, entitlements.max_properties) {
        PublishOutcome::Publish => {
            set_status(&services, property.id, ListingStatus::Published).await
        }
        PublishOutcome::AlreadyPublished => {
            (StatusCode::OK, Json(dto::property_to_json(&property))).into_response()
        }
        PublishOutcome::NotPublishable => errors::json_error(
            StatusCode::CONFLICT,
            "conflict",
            format!("cannot publish a {} property", property.status.as_str()),
        ),
        PublishOutcome::LimitReached => errors::json_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "limit_exceeded",
            format!(
                "publish limit reached ({held}/{} properties)",
                entitlements.max_properties
            ),
        ),
    }
}

/// POST /my/properties/{id}/archive.
pub async fn archive(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    transition(&services, &ctx, &id, ListingStatus::Archived).await
}

/// POST /my/properties/{id}/sold.
pub async fn sold(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    transition(&services, &ctx, &id, ListingStatus::Sold).await
}

/// DELETE /my/properties/{id}.
pub async fn delete(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = errors::require_permission(&ctx, "properties.write") {
        return resp;
    }
    let property = match fetch_owned(&services, &ctx, &id).await {
        Ok(p) => p,
        Err(resp) => return resp,
    };

    match repo::delete(&services.pool, property.id).await {
        Ok(_) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

async fn transition(
    services: &Arc<AppServices>,
    ctx: &RequestContext,
    id: &str,
    target: ListingStatus,
) -> axum::response::Response {
    if let Err(resp) = errors::require_permission(ctx, "properties.write") {
        return resp;
    }
    let property = match fetch_owned(services, ctx, id).await {
        Ok(p) => p,
        Err(resp) => return resp,
    };

    if property.status == target {
        return (StatusCode::OK, Json(dto::property_to_json(&property))).into_response();
    }
    if property.status != ListingStatus::Published {
        return errors::json_error(
            StatusCode::CONFLICT,
            "conflict",
            format!(
                "cannot move a {} property to {}",
                property.status.as_str(),
                target.as_str()
            ),
        );
    }

    set_status(services, property.id, target).await
}

async fn set_status(
    services: &Arc<AppServices>,
    id: PropertyId,
    status: ListingStatus,
) -> axum::response::Response {
    match repo::set_status(&services.pool, id, status, Utc::now()).await {
        Ok(0) => errors::hidden_not_found(),
        Ok(_) => match repo::fetch(&services.pool, id).await {
            Ok(Some(p)) => (StatusCode::OK, Json(dto::property_to_json(&p))).into_response(),
            Ok(None) => errors::hidden_not_found(),
            Err(e) => errors::store_error_to_response(e),
        },
        Err(e) => errors::store_error_to_response(e),
    }
}

/// Fetch + ownership gate. Somebody else's row reads as 404 for non-admins.
async fn fetch_owned(
    services: &Arc<AppServices>,
    ctx: &RequestContext,
    id: &str,
) -> Result<Property, axum::response::Response> {
    let id = parse_id(id)?;
    match repo::fetch(&services.pool, id).await {
        Ok(Some(p)) if ctx.can_manage(p.owner_id) => Ok(p),
        Ok(_) => Err(errors::hidden_not_found()),
        Err(e) => Err(errors::store_error_to_response(e)),
    }
}

fn parse_id(id: &str) -> Result<PropertyId, axum::response::Response> {
    id.parse::<PropertyId>().map_err(|_| {
        errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid property id")
    })
}
