//! Storage errors.
//!
//! ```text
//! sqlx::Error ──► DbError ──► ServiceError::Storage ──► 503 if retryable, else 500
//! ```
//!
//! Constraint failures keep enough detail for the service layer to turn a
//! duplicate VIN or plate into a conflict; everything else is logged by the
//! API and reported to the client without detail.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// `field` is the `table.column` SQLite reports, e.g. `vehicles.vin_number`.
    #[error("Duplicate value for {field}")]
    UniqueViolation { field: String },

    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// A compare-and-set update matched no row because another transaction
    /// moved the row first.
    #[error("{entity} {id} was modified concurrently")]
    StaleWrite { entity: String, id: String },

    /// SQLite write lock still held after the busy timeout.
    #[error("Database is busy")]
    Busy,

    #[error("No pooled connection became free in time")]
    PoolExhausted,

    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    pub fn stale(entity: impl Into<String>, id: impl ToString) -> Self {
        DbError::StaleWrite {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Whether repeating the whole operation may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DbError::StaleWrite { .. }
                | DbError::Busy
                | DbError::PoolExhausted
                | DbError::ConnectionFailed(_)
                | DbError::TransactionFailed(_)
        )
    }

    fn from_sqlite_message(msg: &str) -> Self {
        const UNIQUE: &str = "UNIQUE constraint failed: ";

        if let Some(columns) = msg.strip_prefix(UNIQUE) {
            // Composite keys come back as "t.a, t.b"; the first column names the key.
            let field = columns.split(',').next().unwrap_or(columns).trim();
            DbError::UniqueViolation {
                field: field.to_string(),
            }
        } else if msg.starts_with("FOREIGN KEY constraint failed") {
            DbError::ForeignKeyViolation {
                message: msg.to_string(),
            }
        } else if msg.contains("database is locked") || msg.contains("database is busy") {
            DbError::Busy
        } else {
            DbError::QueryFailed(msg.to_string())
        }
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Row", "query returned no rows"),
            sqlx::Error::Database(db_err) => DbError::from_sqlite_message(db_err.message()),
            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,
            sqlx::Error::PoolClosed => DbError::ConnectionFailed("pool is closed".to_string()),
            other => DbError::Internal(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

pub type DbResult<T> = Result<T, DbError>;
