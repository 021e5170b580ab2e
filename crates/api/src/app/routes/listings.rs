use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use serde::Deserialize;

use vitrina_core::{ListingId, Page, PageQuery, TenantId};
use vitrina_infra::repo::listings as repo;
use vitrina_infra::repo::listings::ListingFilter;
use vitrina_listings::{Listing, ListingDraft, ListingStatus, ListingUpdate, PublishOutcome};

use crate::app::routes::subscriptions::entitlements_for;
use crate::app::{dto, errors, services::AppServices};
use crate::context::RequestContext;

#[derive(Debug, Deserialize)]
pub struct BrowseQuery {
    pub category: Option<String>,
    pub tenant_id: Option<TenantId>,
    pub price_min: Option<i64>,
    pub price_max: Option<i64>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl BrowseQuery {
    fn page(&self) -> PageQuery {
        PageQuery {
            limit: self.limit,
            offset: self.offset,
        }
    }
}

/// GET /listings — public browse of published listings.
pub async fn browse(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<BrowseQuery>,
) -> axum::response::Response {
    let page = query.page();
    let filter = ListingFilter {
        tenant_id: query.tenant_id,
        category: query.category,
        price_min: query.price_min,
        price_max: query.price_max,
    };

    match repo::list_published(&services.pool, &filter, page).await {
        Ok((items, total)) => {
            let (limit, offset) = page.normalize();
            let items = items.iter().map(dto::listing_to_json).collect();
            (StatusCode::OK, Json(Page::new(items, total, limit, offset))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

/// GET /listings/{id} — public fetch; unpublished rows are invisible here.
pub async fn fetch_public(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };

    match repo::fetch(&services.pool, id).await {
        Ok(Some(l)) if l.status == ListingStatus::Published => {
            (StatusCode::OK, Json(dto::listing_to_json(&l))).into_response()
        }
        Ok(_) => errors::hidden_not_found(),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// POST /my/listings — create a draft.
pub async fn create(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    Json(body): Json<ListingDraft>,
) -> axum::response::Response {
    if let Err(resp) = errors::require_permission(&ctx, "listings.write") {
        return resp;
    }
    if let Err(e) = body.validate() {
        return errors::domain_error_to_response(e);
    }

    let listing = body.into_listing(ctx.tenant_id(), ctx.user_id(), Utc::now());
    if let Err(e) = repo::insert(&services.pool, &listing).await {
        return errors::store_error_to_response(e);
    }

    tracing::info!(listing_id = %listing.id, "listing draft created");
    (StatusCode::CREATED, Json(dto::listing_to_json(&listing))).into_response()
}

/// GET /my/listings — all of the caller's listings, any status.
pub async fn list_mine(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
) -> axum::response::Response {
    match repo::list_by_owner(&services.pool, ctx.user_id()).await {
        Ok(items) => {
            let items = items.iter().map(dto::listing_to_json).collect::<Vec<_>>();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

/// GET /my/listings/{id} — owner (or admin) fetch, any status.
pub async fn fetch_mine(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    match fetch_owned(&services, &ctx, &id).await {
        Ok(l) => (StatusCode::OK, Json(dto::listing_to_json(&l))).into_response(),
        Err(resp) => resp,
    }
}

/// PATCH /my/listings/{id}.
pub async fn update(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
    Json(body): Json<ListingUpdate>,
) -> axum::response::Response {
    if let Err(resp) = errors::require_permission(&ctx, "listings.write") {
        return resp;
    }
    let listing = match fetch_owned(&services, &ctx, &id).await {
        Ok(l) => l,
        Err(resp) => return resp,
    };
    if let Err(e) = body.validate() {
        return errors::domain_error_to_response(e);
    }
    if body.is_empty() {
        return errors::json_error(StatusCode::BAD_REQUEST, "validation_error", "empty update");
    }

    match repo::update(&services.pool, listing.id, &body, Utc::now()).await {
        Ok(Some(l)) => (StatusCode::OK, Json(dto::listing_to_json(&l))).into_response(),
        Ok(None) => errors::hidden_not_found(),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// POST /my/listings/{id}/publish — enforces the subscription limit.
pub async fn publish(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = errors::require_permission(&ctx, "listings.publish") {
        return resp;
    }
    let listing = match fetch_owned(&services, &ctx, &id).await {
        Ok(l) => l,
        Err(resp) => return resp,
    };

    let entitlements = match entitlements_for(&services, listing.owner_id).await {
        Ok(e) => e,
        Err(e) => return errors::store_error_to_response(e),
    };
    let held = match repo::count_published_by_owner(&services.pool, listing.owner_id).await {
        Ok(n) => n,
        Err(e) => return errors::store_error_to_response(e),
    };

    match listing.status.publish_outcome(held, entitlements.max_listings) {
        PublishOutcome::Publish => set_status(&services, listing.id, ListingStatus::Published).await,
        PublishOutcome::AlreadyPublished => {
            (StatusCode::OK, Json(dto::listing_to_json(&listing))).into_response()
        }
        PublishOutcome::NotPublishable => errors::json_error(
            StatusCode::CONFLICT,
            "conflict",
            format!("cannot publish a {} listing", listing.status.as_str()),
        ),
        PublishOutcome::LimitReached => errors::json_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "limit_exceeded",
            format!(
                "publish limit reached ({held}/{} listings)",
                entitlements.max_listings
            ),
        ),
    }
}

/// POST /my/listings/{id}/archive.
pub async fn archive(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    transition(&services, &ctx, &id, ListingStatus::Archived).await
}

/// POST /my/listings/{id}/sold.
pub async fn sold(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    transition(&services, &ctx, &id, ListingStatus::Sold).await
}

/// DELETE /my/listings/{id}.
pub async fn delete(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if let Err(resp) = errors::require_permission(&ctx, "listings.write") {
        return resp;
    }
    let listing = match fetch_owned(&services, &ctx, &id).await {
        Ok(l) => l,
        Err(resp) => return resp,
    };

    match repo::delete(&services.pool, listing.id).await {
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
    if let Err(resp) = errors::require_permission(ctx, "listings.write") {
        return resp;
    }
    let listing = match fetch_owned(services, ctx, id).await {
        Ok(l) => l,
        Err(resp) => return resp,
    };

    if listing.status == target {
        return (StatusCode::OK, Json(dto::listing_to_json(&listing))).into_response();
    }
    if listing.status != ListingStatus::Published {
        return errors::json_error(
            StatusCode::CONFLICT,
            "conflict",
            format!(
                "cannot move a {} listing to {}",
                listing.status.as_str(),
                target.as_str()
            ),
        );
    }

    set_status(services, listing.id, target).await
}

async fn set_status(
    services: &Arc<AppServices>,
    id: ListingId,
    status: ListingStatus,
) -> axum::response::Response {
    match repo::set_status(&services.pool, id, status, Utc::now()).await {
        Ok(0) => errors::hidden_not_found(),
        Ok(_) => match repo::fetch(&services.pool, id).await {
            Ok(Some(l)) => (StatusCode::OK, Json(dto::listing_to_json(&l))).into_response(),
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
) -> Result<Listing, axum::response::Response> {
    let id = parse_id(id)?;
    match repo::fetch(&services.pool, id).await {
        Ok(Some(l)) if ctx.can_manage(l.owner_id) => Ok(l),
        Ok(_) => Err(errors::hidden_not_found()),
        Err(e) => Err(errors::store_error_to_response(e)),
    }
}

fn parse_id(id: &str) -> Result<ListingId, axum::response::Response> {
    id.parse::<ListingId>().map_err(|_| {
        errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid listing id")
    })
}
