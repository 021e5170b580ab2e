use std::sync::Arc;

use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};
use chrono::Utc;

use vitrina_core::UserId;
use vitrina_infra::StoreResult;
use vitrina_infra::repo::{plans, subscriptions as repo};
use vitrina_subscriptions::{Entitlements, effective_entitlements};

use crate::app::{dto, errors, services::AppServices};
use crate::context::RequestContext;

/// GET /plans — active plans visible to everyone.
pub async fn list_plans(
    Extension(services): Extension<Arc<AppServices>>,
) -> axum::response::Response {
    match plans::list_active(&services.pool).await {
        Ok(items) => {
            let items = items.iter().map(dto::plan_to_json).collect::<Vec<_>>();
            (StatusCode::OK, Json(serde_json::json!({ "items": items }))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

/// GET /my/subscription — the current entitlements, free tier when nothing
/// is active.
pub async fn my_subscription(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
) -> axum::response::Response {
    if let Err(resp) = errors::require_permission(&ctx, "subscription.read") {
        return resp;
    }
    match repo::effective_for_user(&services.pool, ctx.user_id(), Utc::now()).await {
        Ok(Some((sub, entitlements))) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "subscription": dto::subscription_to_json(&sub),
                "entitlements": dto::entitlements_to_json(&entitlements),
            })),
        )
            .into_response(),
        Ok(None) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "subscription": serde_json::Value::Null,
                "entitlements": dto::entitlements_to_json(&Entitlements::free_tier()),
            })),
        )
            .into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// GET /my/subscription/payment — payment status of the newest subscription.
pub async fn my_payment_status(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
) -> axum::response::Response {
    if let Err(resp) = errors::require_permission(&ctx, "subscription.read") {
        return resp;
    }
    match repo::newest_for_user(&services.pool, ctx.user_id()).await {
        Ok(Some(sub)) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "subscription_id": sub.id.to_string(),
                "status": sub.status.as_str(),
                "payment_status": sub.payment_status.as_str(),
                "period_end": sub.period_end,
            })),
        )
            .into_response(),
        Ok(None) => errors::json_error(
            StatusCode::NOT_FOUND,
            "not_found",
            "no subscription on record",
        ),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// Resolve the entitlements a user currently holds. Publish handlers call
/// this before counting held slots.
pub async fn entitlements_for(
    services: &AppServices,
    user_id: UserId,
) -> StoreResult<Entitlements> {
    let effective = repo::effective_for_user(&services.pool, user_id, Utc::now()).await?;
    Ok(effective_entitlements(
        effective.map(|(_, entitlements)| entitlements),
    ))
}
