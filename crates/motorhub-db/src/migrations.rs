//! Schema migrations, embedded at compile time from `migrations/sqlite/`.
//!
//! Files are numbered (`001_initial_schema.sql`, ...) and applied in order
//! on startup unless `run_migrations` is off. Applied files are checksummed
//! by sqlx, so changing one after release fails the next start; ship a new
//! numbered file instead.

use sqlx::migrate::Migrator;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::DbResult;

static MIGRATOR: Migrator = sqlx::migrate!("../../migrations/sqlite");

pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    debug!(embedded = MIGRATOR.migrations.len(), "Applying schema migrations");
    MIGRATOR.run(pool).await?;

    let (embedded, applied) = migration_status(pool).await?;
    info!(embedded, applied, "Schema up to date");
    Ok(())
}

/// `(embedded, applied)`; the health endpoint reports both.
pub async fn migration_status(pool: &SqlitePool) -> DbResult<(usize, usize)> {
    let applied: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM _sqlx_migrations WHERE success = 1",
    )
    .fetch_one(pool)
    .await?;

    Ok((MIGRATOR.migrations.len(), applied as usize))
}
