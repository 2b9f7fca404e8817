use anyhow::{Context, Result};
use deadpool_postgres::{Config, ManagerConfig, Pool, PoolConfig, RecyclingMethod, Runtime, Timeouts};
use tokio_postgres::NoTls;

use crate::config::PostgresConfig;

const SCHEMA: &str = include_str!("../migrations/0001_init.sql");

/// Creates a new database connection pool.
///
/// # Arguments
///
/// * `config` - The PostgreSQL connection settings.
///
/// # Returns
///
/// A `Result` containing the `Pool`.
pub fn create_pool(config: &PostgresConfig) -> Result<Pool> {
    let mut cfg = Config::new();
    cfg.host = Some(config.host.clone());
    cfg.port = Some(config.port);
    cfg.user = Some(config.user.clone());
    cfg.password = Some(config.password.clone());
    cfg.dbname = Some(config.dbname.clone());

    cfg.manager = Some(ManagerConfig {
        recycling_method: RecyclingMethod::Fast,
    });

    let mut pool = PoolConfig::new(config.max_connections);
    pool.timeouts = Timeouts {
        wait: Some(config.timeout),
        create: Some(config.timeout),
        recycle: Some(config.timeout),
    };
    cfg.pool = Some(pool);

    cfg.create_pool(Some(Runtime::Tokio1), NoTls)
        .context("Failed to create PostgreSQL pool")
}

/// Applies the embedded schema. Every statement is idempotent.
pub async fn migrate(pool: &Pool) -> Result<()> {
    let client = pool
        .get()
        .await
        .context("Failed to get a connection for migrations")?;

    client
        .batch_execute(SCHEMA)
        .await
        .context("Failed to apply database schema")?;

    tracing::info!("✅ Database schema is up to date");
    Ok(())
}
