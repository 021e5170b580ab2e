use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use sqlx::PgPool;

use vitrina_auth::{digest_token, validate_session};
use vitrina_infra::repo::sessions;

use crate::context::RequestContext;

/// Name of the session cookie set by `POST /auth/login`.
pub const SESSION_COOKIE: &str = "vitrina_session";

#[derive(Clone)]
pub struct AuthState {
    pub pool: PgPool,
}

/// Session auth: token from `Authorization: Bearer` or the session cookie,
/// resolved against the sessions table and validated for expiry.
pub async fn session_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let token = extract_token(req.headers())?;
    let digest = digest_token(token);

    let claims = sessions::find_by_digest(&state.pool, &digest)
        .await
        .map_err(|e| {
            tracing::error!("session lookup failed: {e}");
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .ok_or(StatusCode::UNAUTHORIZED)?;

    validate_session(&claims, Utc::now()).map_err(|_e| StatusCode::UNAUTHORIZED)?;

    req.extensions_mut().insert(RequestContext::new(
        claims.user_id,
        claims.tenant_id,
        claims.role,
        digest,
    ));

    Ok(next.run(req).await)
}

/// Admin gate, layered on top of `session_middleware`.
pub async fn admin_middleware(
    req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let ctx = req
        .extensions()
        .get::<RequestContext>()
        .ok_or(StatusCode::UNAUTHORIZED)?;

    if !ctx.is_admin() {
        return Err(StatusCode::FORBIDDEN);
    }

    Ok(next.run(req).await)
}

fn extract_token(headers: &HeaderMap) -> Result<&str, StatusCode> {
    if let Some(header) = headers.get(axum::http::header::AUTHORIZATION) {
        let header = header.to_str().map_err(|_| StatusCode::UNAUTHORIZED)?;
        let token = header
            .strip_prefix("Bearer ")
            .ok_or(StatusCode::UNAUTHORIZED)?
            .trim();
        if token.is_empty() {
            return Err(StatusCode::UNAUTHORIZED);
        }
        return Ok(token);
    }

    session_cookie(headers).ok_or(StatusCode::UNAUTHORIZED)
}

/// Pull the session token out of the `Cookie` header, if present.
fn session_cookie(headers: &HeaderMap) -> Option<&str> {
    let cookies = headers.get(axum::http::header::COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE && !value.is_empty()).then_some(value)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::COOKIE;

    #[test]
    fn cookie_parsing_finds_session_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            "theme=dark; vitrina_session=abc123; lang=en".parse().unwrap(),
        );
        assert_eq!(session_cookie(&headers), Some("abc123"));
    }

    #[test]
    fn missing_or_empty_cookie_yields_none() {
        let headers = HeaderMap::new();
        assert_eq!(session_cookie(&headers), None);

        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, "vitrina_session=".parse().unwrap());
        assert_eq!(session_cookie(&headers), None);
    }

    #[test]
    fn bearer_takes_precedence() {
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::AUTHORIZATION,
            "Bearer tok-1".parse().unwrap(),
        );
        headers.insert(COOKIE, "vitrina_session=tok-2".parse().unwrap());
        assert_eq!(extract_token(&headers).unwrap(), "tok-1");
    }

    #[test]
    fn malformed_bearer_is_rejected() {
        let mut headers = HeaderMap::new();
        headers.insert(
            axum::http::header::AUTHORIZATION,
            "Basic dXNlcg==".parse().unwrap(),
        );
        assert_eq!(extract_token(&headers), Err(StatusCode::UNAUTHORIZED));
    }
}
