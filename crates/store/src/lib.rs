pub mod error;
pub mod models;
pub mod repo;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

use warden_core::config::DatabaseConfig;

pub use error::StoreError;
pub use repo::*;

/// Connects to Postgres and runs pending migrations. Grounded in the
/// teacher's `init_pg_pool` (`crates/server/src/db.rs`): connect, mask the
/// password before logging, migrate, return the pool.
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, StoreError> {
    let url = config.connection_string();
    tracing::info!(
        host = %config.host,
        port = config.port,
        database = %config.name,
        "connecting to store"
    );
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&url)
        .await?;
    sqlx::migrate!("./migrations").run(&pool).await.map_err(|e| {
        tracing::error!(error = %e, "migration failed");
        sqlx::Error::Migrate(Box::new(e))
    })?;
    tracing::info!("store ready");
    Ok(pool)
}
