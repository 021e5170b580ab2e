//! Reverse proxy for the external data feed under `/ext/`.
//!
//! GET only, query string forwarded as-is. The upstream base URL and the
//! fixed timeout come from configuration; a timed-out upstream reads as 504,
//! an unreachable one as 502.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path, RawQuery},
    http::{StatusCode, header},
    response::IntoResponse,
};

use crate::app::{errors, services::AppServices};

/// GET /ext/{path}.
pub async fn forward(
    Extension(services): Extension<Arc<AppServices>>,
    Path(path): Path<String>,
    RawQuery(query): RawQuery,
) -> axum::response::Response {
    let base = services.config.upstream_url.trim_end_matches('/');
    let mut url = format!("{base}/{path}");
    if let Some(query) = query {
        url.push('?');
        url.push_str(&query);
    }

    let upstream = match services.http.get(&url).send().await {
        Ok(resp) => resp,
        Err(e) if e.is_timeout() => {
            tracing::warn!(%url, "upstream timed out");
            return errors::json_error(
                StatusCode::GATEWAY_TIMEOUT,
                "upstream_timeout",
                "upstream did not respond in time",
            );
        }
        Err(e) => {
            tracing::warn!(%url, "upstream request failed: {e}");
            return errors::json_error(
                StatusCode::BAD_GATEWAY,
                "upstream_unreachable",
                "upstream request failed",
            );
        }
    };

    let status =
        StatusCode::from_u16(upstream.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
    let content_type = upstream
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/octet-stream")
        .to_string();

    match upstream.bytes().await {
        Ok(body) => (status, [(header::CONTENT_TYPE, content_type)], body).into_response(),
        Err(e) => {
            tracing::warn!(%url, "upstream body read failed: {e}");
            errors::json_error(
                StatusCode::BAD_GATEWAY,
                "upstream_unreachable",
                "upstream response could not be read",
            )
        }
    }
}
