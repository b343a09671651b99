//! # Migrations
//!
//! SQL files under `crates/velmo-store/migrations/`, embedded at compile
//! time and applied in file-name order. sqlx records each applied file in
//! `_sqlx_migrations`, so opening the store twice is harmless.
//!
//! New schema changes go in a new numbered file (`002_<what>.sql`). An
//! applied file is never edited: sqlx refuses to start when a checksum
//! changes.

use sqlx::migrate::Migrator;
use sqlx::SqlitePool;
use tracing::info;

use crate::error::DbResult;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Applies every pending migration.
pub async fn apply(pool: &SqlitePool) -> DbResult<()> {
    MIGRATOR.run(pool).await?;
    info!(known = known_count(), "Local store schema up to date");
    Ok(())
}

/// Number of migrations compiled into the binary.
pub fn known_count() -> usize {
    MIGRATOR.migrations.len()
}

/// Number of migrations recorded as applied.
pub async fn applied_count(pool: &SqlitePool) -> DbResult<usize> {
    let applied: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = 1")
            .fetch_one(pool)
            .await?;
    Ok(usize::try_from(applied).unwrap_or_default())
}
