//! Connection pool construction.

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::error::StoreResult;

/// Connect eagerly, verifying the database is reachable.
pub async fn connect(database_url: &str) -> StoreResult<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(database_url)
        .await?;
    Ok(pool)
}

/// Build a pool without touching the database.
///
/// Connections are established on first use; this keeps server startup (and
/// DB-free tests of the HTTP surface) independent of Postgres availability.
pub fn connect_lazy(database_url: &str) -> StoreResult<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect_lazy(database_url)?;
    Ok(pool)
}
