use anyhow::Result;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use tracing::info;

use crate::config::DatabaseConfig;

#[derive(Clone)]
pub struct DbPool {
    pool: PgPool,
}

impl DbPool {
    /// Builds the pool without opening a connection; the first query connects.
    pub fn connect_lazy(url: &str, config: &DatabaseConfig) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.pool_max_size.max(1))
            .acquire_timeout(Duration::from_secs(config.pool_timeout_seconds.max(1)))
            .connect_lazy(url)?;

        info!(
            "Database pool configured: max_connections={}, acquire_timeout={}s",
            config.pool_max_size, config.pool_timeout_seconds
        );

        Ok(Self { pool })
    }

    pub fn get_pool(&self) -> &PgPool {
        &self.pool
    }
}
