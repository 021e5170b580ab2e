use axum::{
    Router,
    routing::{get, post},
};

pub mod admin;
pub mod auth;
pub mod leads;
pub mod listings;
pub mod media;
pub mod properties;
pub mod proxy;
pub mod subscriptions;
pub mod system;

/// Unauthenticated surface: browsing, lead capture, login, media, proxy.
pub fn public_router() -> Router {
    Router::new()
        .route("/listings", get(listings::browse))
        .route("/listings/:id", get(listings::fetch_public))
        .route("/properties", get(properties::browse))
        .route("/properties/:id", get(properties::fetch_public))
        .route("/plans", get(subscriptions::list_plans))
        .route("/leads", post(leads::start))
        .route("/leads/:id", get(leads::fetch))
        .route("/leads/:id/steps/:step", axum::routing::put(leads::upsert_step))
        .route("/leads/:id/submit", post(leads::submit))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/media/*path", get(media::serve))
        .route("/ext/*path", get(proxy::forward))
}

/// Session-scoped surface: account, owned rows, subscription lookups.
pub fn protected_router() -> Router {
    Router::new()
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))
        .route("/my/listings", get(listings::list_mine).post(listings::create))
        .route(
            "/my/listings/:id",
            get(listings::fetch_mine)
                .patch(listings::update)
                .delete(listings::delete),
        )
        .route("/my/listings/:id/publish", post(listings::publish))
        .route("/my/listings/:id/archive", post(listings::archive))
        .route("/my/listings/:id/sold", post(listings::sold))
        .route(
            "/my/properties",
            get(properties::list_mine).post(properties::create),
        )
        .route(
            "/my/properties/:id",
            get(properties::fetch_mine)
                .patch(properties::update)
                .delete(properties::delete),
        )
        .route("/my/properties/:id/publish", post(properties::publish))
        .route("/my/properties/:id/archive", post(properties::archive))
        .route("/my/properties/:id/sold", post(properties::sold))
        .route("/my/subscription", get(subscriptions::my_subscription))
        .route(
            "/my/subscription/payment",
            get(subscriptions::my_payment_status),
        )
}
