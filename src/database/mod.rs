use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;
use tracing::info;

use crate::config::DatabaseConfig;

pub mod models;
pub mod repository;

/// Build the shared connection pool handed to every module at composition
/// time. Connectivity problems surface here, before any routes are bound.
pub async fn connect(cfg: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(cfg.max_connections)
        .acquire_timeout(Duration::from_secs(cfg.connect_timeout_secs))
        .connect(&cfg.url)
        .await?;

    info!("database pool ready (max_connections={})", cfg.max_connections);
    Ok(pool)
}
