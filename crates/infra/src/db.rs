//! Connection pool setup.

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::config::DatabaseConfig;
use crate::store::{StoreResult, postgres::map_sqlx_error};

pub async fn connect(config: &DatabaseConfig) -> StoreResult<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.url)
        .await
        .map_err(|e| map_sqlx_error("connect", e))?;
    tracing::info!(max_connections = config.max_connections, "connected to postgres");
    Ok(pool)
}
