use std::sync::Arc;

use axum::{
    Json,
    extract::Extension,
    http::{StatusCode, header},
    response::IntoResponse,
};
use chrono::{Duration, Utc};

use vitrina_auth::{
    Role, SessionToken, UserAccount, hash_password, normalize_email, validate_new_password,
    verify_password,
};
use vitrina_core::{SessionId, TenantId, UserId};
use vitrina_infra::repo::{sessions, users};

use crate::app::{dto, errors, services::AppServices};
use crate::context::RequestContext;
use crate::middleware::SESSION_COOKIE;

pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::RegisterRequest>,
) -> axum::response::Response {
    let tenant_id = match parse_tenant(&services, body.tenant_id.as_deref()) {
        Ok(t) => t,
        Err(resp) => return resp,
    };

    let email = match normalize_email(&body.email) {
        Ok(e) => e,
        Err(e) => return errors::domain_error_to_response(e),
    };
    if let Err(e) = validate_new_password(&body.password) {
        return errors::domain_error_to_response(e);
    }
    if body.display_name.trim().is_empty() {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "display_name must not be empty",
        );
    }

    let now = Utc::now();
    let user = UserAccount {
        id: UserId::new(),
        tenant_id,
        email,
        password_hash: hash_password(&body.password),
        display_name: body.display_name.trim().to_string(),
        role: Role::user(),
        active: true,
        created_at: now,
        updated_at: now,
    };

    if let Err(e) = users::insert(&services.pool, &user).await {
        return errors::store_error_to_response(e);
    }

    tracing::info!(user_id = %user.id, "user registered");
    (StatusCode::CREATED, Json(dto::user_to_json(&user))).into_response()
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::LoginRequest>,
) -> axum::response::Response {
    let tenant_id = match parse_tenant(&services, body.tenant_id.as_deref()) {
        Ok(t) => t,
        Err(resp) => return resp,
    };

    let email = match normalize_email(&body.email) {
        Ok(e) => e,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let user = match users::fetch_by_email(&services.pool, tenant_id, &email).await {
        Ok(Some(u)) => u,
        Ok(None) => return invalid_credentials(),
        Err(e) => return errors::store_error_to_response(e),
    };

    if !user.active || !verify_password(&body.password, &user.password_hash) {
        return invalid_credentials();
    }

    let token = SessionToken::generate();
    let now = Utc::now();
    let ttl = Duration::hours(services.config.session_ttl_hours);
    if let Err(e) = sessions::insert(
        &services.pool,
        SessionId::new(),
        user.id,
        &token.digest,
        now,
        now + ttl,
    )
    .await
    {
        return errors::store_error_to_response(e);
    }

    let cookie = format!(
        "{SESSION_COOKIE}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        token.token,
        ttl.num_seconds()
    );

    tracing::info!(user_id = %user.id, "login");
    (
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(serde_json::json!({
            "token": token.token,
            "user": dto::user_to_json(&user),
        })),
    )
        .into_response()
}

pub async fn logout(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
) -> axum::response::Response {
    if let Err(e) = sessions::delete_by_digest(&services.pool, ctx.token_digest()).await {
        return errors::store_error_to_response(e);
    }

    // Expire the cookie client-side as well.
    let cookie = format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    (StatusCode::NO_CONTENT, [(header::SET_COOKIE, cookie)]).into_response()
}

pub async fn me(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(ctx): Extension<RequestContext>,
) -> axum::response::Response {
    match users::fetch(&services.pool, ctx.user_id()).await {
        Ok(Some(user)) => (StatusCode::OK, Json(dto::user_to_json(&user))).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "not_found", "user not found"),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub(crate) fn parse_tenant(
    services: &AppServices,
    raw: Option<&str>,
) -> Result<TenantId, axum::response::Response> {
    match raw {
        None => Ok(services.config.default_tenant),
        Some(s) => s.parse().map_err(|_| {
            errors::json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid tenant id")
        }),
    }
}

/// One shared response for unknown email, wrong password and inactive
/// accounts, so login failures don't enumerate users.
fn invalid_credentials() -> axum::response::Response {
    errors::json_error(
        StatusCode::UNAUTHORIZED,
        "invalid_credentials",
        "invalid email or password",
    )
}
