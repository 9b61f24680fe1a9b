//! Postgres pool and schema setup for the `companies` / `jobs` database.
//!
//! The schema lives in `migrations/` at the workspace root and is embedded
//! into the binary at build time, so `jobly migrate` needs no files on disk.

use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::{debug, info};

use crate::DbError;

/// Shared pool handed to every repository function.
pub type DbPool = PgPool;

/// Embedded `companies` and `jobs` schema.
pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Connect to `database_url`, holding at most `max_connections`.
///
/// Connections are opened eagerly so a bad URL fails here rather than on
/// the first repository call.
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<DbPool, DbError> {
    info!(max_connections, "connecting to jobly database");
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;
    Ok(pool)
}

/// Bring the `companies` / `jobs` schema up to date.
pub async fn run_migrations(pool: &DbPool) -> Result<(), DbError> {
    for migration in MIGRATOR.iter() {
        debug!(version = migration.version, description = %migration.description, "known migration");
    }
    info!(count = MIGRATOR.iter().count(), "applying schema migrations");
    MIGRATOR.run(pool).await?;
    Ok(())
}
