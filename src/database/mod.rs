//! Persistence layer for the attempt log, using SQLite via sqlx.

pub mod models;
pub mod repositories;

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Pool, Sqlite};

/// Database connection pool type alias.
pub type DbPool = Pool<Sqlite>;

/// How long a connection waits on a locked database before giving up.
const BUSY_TIMEOUT_MS: u64 = 5_000;

/// Build a SQLite URL for a database file, creating the file if absent.
pub fn database_url(db_name: &str) -> String {
    format!("sqlite:{db_name}?mode=rwc")
}

/// Initialize the database connection pool.
///
/// The tool is single-threaded, so the pool stays small; WAL mode keeps the
/// optional dashboard process able to read while we write.
pub async fn init_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    let connect_options = SqliteConnectOptions::from_str(database_url)?
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(Duration::from_millis(BUSY_TIMEOUT_MS))
        .create_if_missing(true);

    SqlitePoolOptions::new()
        .max_connections(2)
        .connect_with(connect_options)
        .await
}

/// Apply schema migrations. Safe to run on every startup.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

#[cfg(test)]
pub(crate) async fn test_pool() -> DbPool {
    // A single connection keeps every operation on the same in-memory database.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory pool");
    run_migrations(&pool).await.expect("migrations");
    pool
}
