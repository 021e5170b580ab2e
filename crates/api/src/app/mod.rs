//! HTTP API application wiring (Axum router + service wiring).
//!
//! Layout:
//! - `services.rs`: shared services (pool, proxy client, config)
//! - `routes/`: HTTP routes + handlers (one file per domain area)
//! - `dto.rs`: request/response DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::http::{HeaderValue, Method, header};
use axum::{Extension, Router, routing::get};
use sqlx::PgPool;
use tower_http::cors::{Any, CorsLayer};

use crate::config::Config;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs` and the
/// black-box tests).
pub fn build_app(config: Config, pool: PgPool) -> Router {
    let auth_state = middleware::AuthState { pool: pool.clone() };
    let cors = cors_layer(&config);
    let services = Arc::new(services::AppServices::new(config, pool));

    // Protected routes: require a live session.
    let protected = routes::protected_router().layer(axum::middleware::from_fn_with_state(
        auth_state.clone(),
        middleware::session_middleware,
    ));

    // Admin routes: session + role gate.
    let admin = routes::admin::router()
        .layer(axum::middleware::from_fn(middleware::admin_middleware))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::session_middleware,
        ));

    Router::new()
        .route("/health", get(routes::system::health))
        .merge(routes::public_router())
        .merge(protected)
        .nest("/admin", admin)
        .layer(Extension(services))
        .layer(cors)
}

fn cors_layer(config: &Config) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    match config.cors_origin.as_str() {
        "*" => layer.allow_origin(Any),
        origin => match origin.parse::<HeaderValue>() {
            Ok(value) => layer.allow_origin(value),
            Err(_) => {
                tracing::warn!("invalid CORS origin '{origin}', falling back to any");
                layer.allow_origin(Any)
            }
        },
    }
}
