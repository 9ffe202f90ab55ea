//! SQLite pool construction.
//!
//! Migrations under `migrations/` run on every connect, so a fresh file or an
//! in-memory database is immediately usable.

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use tracing::info;

use crate::common::Result;

/// Connect to the database at `database_url` and apply migrations.
///
/// # Example URLs
/// - `sqlite://media_agent.db?mode=rwc` - File-based, created if missing
/// - `sqlite::memory:` - In-memory (see [`connect_in_memory`])
pub async fn connect(database_url: &str) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    migrate(&pool).await?;
    info!(url = %database_url, "Database ready");
    Ok(pool)
}

/// In-memory database for tests and dry runs.
///
/// A single connection that is never recycled keeps every query on the same
/// memory database.
pub async fn connect_in_memory() -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    migrate(&pool).await?;
    Ok(pool)
}

pub async fn migrate(pool: &SqlitePool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Unique-constraint violations are normal negative results for inserts.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => db.is_unique_violation(),
        _ => false,
    }
}
