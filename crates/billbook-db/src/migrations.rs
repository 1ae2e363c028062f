//! # Schema Migrations
//!
//! The SQL files under `crates/billbook-db/migrations/` are compiled into
//! the binary and applied in file-name order when a [`Database`] opens.
//! sqlx records each applied file in `_sqlx_migrations`, so reopening an
//! up-to-date database is a no-op.
//!
//! Changing the schema means adding `NNN_description.sql` with the next
//! number. Applied files are checksummed and must stay as they are.
//!
//! [`Database`]: crate::Database

use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::DbResult;

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Applies every migration not yet recorded.
pub async fn run_migrations(pool: &SqlitePool) -> DbResult<()> {
    debug!(embedded = MIGRATOR.migrations.len(), "Applying migrations");
    MIGRATOR.run(pool).await?;
    info!("Database schema up to date");
    Ok(())
}

/// `(embedded, applied)` counts. A fresh, unmigrated file reports zero
/// applied.
pub async fn migration_status(pool: &SqlitePool) -> DbResult<(usize, usize)> {
    let embedded = MIGRATOR.migrations.len();

    let applied: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations WHERE success = 1")
            .fetch_one(pool)
            .await
            .unwrap_or(0);

    Ok((embedded, usize::try_from(applied).unwrap_or(0)))
}
