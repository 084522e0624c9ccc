//! # Quiz DB
//!
//! Database pool and migrations for the Quiz application.
//!
//! # Example
//!
//! ```ignore
//! use quiz_config::DatabaseConfig;
//! use quiz_db::{init_db_pool, run_migrations};
//!
//! let pool = init_db_pool(&DatabaseConfig::from_env()).await?;
//! run_migrations(&pool).await?;
//! ```

use std::time::Duration;

use quiz_config::DatabaseConfig;
use sqlx::postgres::PgPoolOptions;
use tracing::info;

// Re-export PgPool for convenience
pub use sqlx::PgPool;

/// Migrations embedded from the workspace `migrations/` directory.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations");

/// Opens a PostgreSQL connection pool.
///
/// The returned pool is cheaply cloneable and should be created once at startup
/// and shared through the application state.
pub async fn init_db_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(10))
        .connect(&config.url)
        .await?;

    info!(max_connections = config.max_connections, "Database pool ready");

    Ok(pool)
}

/// Pool that connects on first use. Nothing touches the database until a query
/// runs, which lets routing-only code run without a server.
pub fn lazy_db_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(2))
        .connect_lazy(&config.url)
}

/// Applies pending migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    MIGRATOR.run(pool).await?;
    info!("Database migrations applied");
    Ok(())
}
