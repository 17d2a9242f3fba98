//! # Connection Pool
//!
//! One [`Database`] per process, shared by every request.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  register sale A ─► begin_immediate() ─► conn 1  holds write lock      │
//! │  register sale B ─► begin_immediate() ─► conn 2  waits (busy_timeout)  │
//! │  GET /api/vehicles ─► acquire() ─► conn 3  SELECT ...  (WAL: no wait)  │
//! │                                                                         │
//! │  A commits ──► B reads the vehicle as Reserved ──► Conflict            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Writers queue for up to `busy_timeout`; past that the statement fails
//! with [`DbError::Busy`]. Tests that need real concurrency use a file
//! database with several connections; [`DbConfig::in_memory`] has one.

use sqlx::pool::PoolConnection;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Sqlite, SqlitePool, Transaction};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::migrations;

/// Pool and SQLite settings.
///
/// ```rust,ignore
/// let config = DbConfig::new("/var/lib/motorhub/motorhub.db")
///     .max_connections(8)
///     .busy_timeout(Duration::from_secs(10));
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// SQLite file, created on first use. `:memory:` for a private in-memory database.
    pub database_path: PathBuf,
    pub max_connections: u32,
    pub min_connections: u32,
    /// How long a caller waits for a free pooled connection.
    pub acquire_timeout: Duration,
    pub idle_timeout: Duration,
    /// How long a writer waits on the SQLite write lock.
    pub busy_timeout: Duration,
    /// Apply pending migrations in [`Database::new`].
    pub run_migrations: bool,
}

impl DbConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            busy_timeout: Duration::from_secs(5),
            run_migrations: true,
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    /// Migrated in-memory database on a single connection.
    ///
    /// Every caller, transactions included, takes turns on that connection,
    /// so tests see one consistent database.
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(":memory:"),
            max_connections: 1,
            acquire_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(60),
            ..DbConfig::new(":memory:")
        }
    }
}

/// Handle to the marketplace database.
///
/// Clones share the pool. Repository functions take a `&mut SqliteConnection`
/// from [`Database::acquire`] (single reads) or [`Database::begin_immediate`]
/// (multi-step workflows).
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens the pool with WAL journaling, NORMAL sync, foreign keys on and
    /// the configured busy timeout, then migrates if asked to.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(path = %config.database_path.display(), "Opening marketplace database");

        let url = format!("sqlite://{}?mode=rwc", config.database_path.display());
        let options = SqliteConnectOptions::from_str(&url)
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true)
            .busy_timeout(config.busy_timeout)
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.acquire_timeout)
            .idle_timeout(Some(config.idle_timeout))
            .connect_with(options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        debug!(
            max_connections = config.max_connections,
            busy_timeout_ms = config.busy_timeout.as_millis() as u64,
            "Pool ready"
        );

        let db = Database { pool };
        if config.run_migrations {
            db.run_migrations().await?;
        }
        Ok(db)
    }

    /// Applies pending migrations; a no-op when up to date.
    pub async fn run_migrations(&self) -> DbResult<()> {
        migrations::run_migrations(&self.pool).await
    }

    /// `(embedded, applied)` migration counts.
    pub async fn migration_status(&self) -> DbResult<(usize, usize)> {
        migrations::migration_status(&self.pool).await
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// A pooled connection for reads outside a transaction.
    pub async fn acquire(&self) -> DbResult<PoolConnection<Sqlite>> {
        Ok(self.pool.acquire().await?)
    }

    /// Starts a transaction.
    ///
    /// Dropping it without [`commit`] rolls back, including when the request
    /// future holding it is cancelled.
    pub async fn begin(&self) -> DbResult<Transaction<'static, Sqlite>> {
        self.pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))
    }

    /// Starts a transaction holding the write lock (`BEGIN IMMEDIATE`).
    ///
    /// Use it for read-then-write workflows. A deferred transaction that
    /// reads first cannot later upgrade to a write once another connection
    /// has committed, and SQLite fails it with `database is locked` without
    /// waiting. Here the wait happens up front, bounded by `busy_timeout`,
    /// and every read inside sees the latest committed state.
    pub async fn begin_immediate(&self) -> DbResult<Transaction<'static, Sqlite>> {
        self.pool.begin_with("BEGIN IMMEDIATE").await.map_err(|e| match DbError::from(e) {
            DbError::Busy => DbError::Busy,
            other => DbError::TransactionFailed(other.to_string()),
        })
    }

    pub async fn close(&self) {
        info!("Closing marketplace database");
        self.pool.close().await;
    }

    /// Whether `SELECT 1` succeeds.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}

/// Commits a transaction opened with [`Database::begin`] or
/// [`Database::begin_immediate`].
pub async fn commit(tx: Transaction<'static, Sqlite>) -> DbResult<()> {
    tx.commit()
        .await
        .map_err(|e| DbError::TransactionFailed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_database_is_migrated() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        assert!(db.health_check().await);
        let (embedded, applied) = db.migration_status().await.unwrap();
        assert!(embedded >= 1);
        assert_eq!(embedded, applied);

        // Second run finds nothing pending
        db.run_migrations().await.unwrap();
        assert_eq!(db.migration_status().await.unwrap(), (embedded, applied));
    }

    #[test]
    fn test_config_builder() {
        let config = DbConfig::new("/tmp/motorhub.db")
            .max_connections(10)
            .busy_timeout(Duration::from_secs(1))
            .run_migrations(false);

        assert_eq!(config.max_connections, 10);
        assert_eq!(config.busy_timeout, Duration::from_secs(1));
        assert!(!config.run_migrations);

        let memory = DbConfig::in_memory();
        assert_eq!(memory.max_connections, 1);
        assert_eq!(memory.database_path, PathBuf::from(":memory:"));
    }

    #[tokio::test]
    async fn test_rolled_back_transaction_leaves_no_trace() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let mut tx = db.begin().await.unwrap();
        sqlx::query("CREATE TABLE scratch (id INTEGER)")
            .execute(&mut *tx)
            .await
            .unwrap();
        drop(tx);

        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE name = 'scratch')",
        )
        .fetch_one(db.pool())
        .await
        .unwrap();
        assert!(!exists);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_immediate_transactions_take_turns() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(DbConfig::new(dir.path().join("turns.db")).max_connections(4))
            .await
            .unwrap();
        sqlx::query("CREATE TABLE counter (n INTEGER NOT NULL)")
            .execute(db.pool())
            .await
            .unwrap();
        sqlx::query("INSERT INTO counter (n) VALUES (0)")
            .execute(db.pool())
            .await
            .unwrap();

        // Read-modify-write in each task; lost updates would leave n < 8
        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let db = db.clone();
                tokio::spawn(async move {
                    let mut tx = db.begin_immediate().await?;
                    let n: i64 = sqlx::query_scalar("SELECT n FROM counter")
                        .fetch_one(&mut *tx)
                        .await?;
                    sqlx::query("UPDATE counter SET n = ?1")
                        .bind(n + 1)
                        .execute(&mut *tx)
                        .await?;
                    commit(tx).await
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let n: i64 = sqlx::query_scalar("SELECT n FROM counter")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(n, 8);
        db.close().await;
    }

    #[tokio::test]
    async fn test_closed_pool_is_unhealthy() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.close().await;
        assert!(!db.health_check().await);
    }
}
