use std::time::Duration;

use sqlx::PgPool;

use crate::config::Config;

/// Shared application services: the connection pool, the proxy HTTP client
/// and the loaded configuration.
pub struct AppServices {
    pub pool: PgPool,
    pub config: Config,
    /// Client for the `/ext/` reverse proxy; carries the fixed upstream
    /// timeout so every proxied call inherits it.
    pub http: reqwest::Client,
}

impl AppServices {
    pub fn new(config: Config, pool: PgPool) -> Self {
        // Startup-fatal: a fallback client would not carry the timeout.
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.upstream_timeout_secs))
            .build()
            .expect("proxy HTTP client construction failed");

        Self { pool, config, http }
    }
}
