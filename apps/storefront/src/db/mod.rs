// apps/storefront/src/db/mod.rs

//! Postgres persistence: the order store, connection pool lifecycle and migrations.

pub mod pg_store;

pub use pg_store::PgOrderStore;

use crate::config::AppConfig;
use crate::errors::{AppError, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Opens the one pool the process uses; it is closed by `main` on shutdown.
pub async fn connect(config: &AppConfig) -> Result<PgPool> {
  let pool = PgPoolOptions::new()
    .max_connections(config.database_max_connections)
    .acquire_timeout(config.store_timeout)
    .connect(&config.database_url)
    .await?;
  info!(max_connections = config.database_max_connections, "Connected to the database.");
  Ok(pool)
}

pub async fn run_migrations(pool: &PgPool) -> Result<()> {
  sqlx::migrate!("./migrations")
    .run(pool)
    .await
    .map_err(|e| AppError::Internal(format!("Database migration failed: {}", e)))?;
  info!("Database migrations applied.");
  Ok(())
}
