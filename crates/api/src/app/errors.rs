use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use vitrina_auth::{Permission, authorize};
use vitrina_core::DomainError;
use vitrina_infra::StoreError;

use crate::context::RequestContext;

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(msg) => json_error(StatusCode::BAD_REQUEST, "validation_error", msg),
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
        DomainError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        DomainError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        DomainError::Unauthorized => json_error(StatusCode::FORBIDDEN, "unauthorized", "unauthorized"),
        DomainError::LimitExceeded(msg) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "limit_exceeded", msg)
        }
    }
}

pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    match err {
        StoreError::NotFound => json_error(StatusCode::NOT_FOUND, "not_found", "not found"),
        StoreError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        StoreError::Decode(msg) => {
            tracing::error!("row decode failed: {msg}");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "decode_error", msg)
        }
        StoreError::Database(e) => {
            tracing::error!("database error: {e}");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "store_error",
                "storage failure",
            )
        }
    }
}

/// Check the caller's role against the static permission policy.
pub fn require_permission(
    ctx: &RequestContext,
    permission: &'static str,
) -> Result<(), axum::response::Response> {
    authorize(ctx.role(), &Permission::new(permission))
        .map_err(|e| json_error(StatusCode::FORBIDDEN, "forbidden", e.to_string()))
}

/// 404 used for ownership failures, so row existence is not leaked.
pub fn hidden_not_found() -> axum::response::Response {
    json_error(StatusCode::NOT_FOUND, "not_found", "not found")
}
