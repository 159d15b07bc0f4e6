//! # Store Error Types
//!
//! Error types for SQLite operations, plus the mapping into the engine's
//! [`LookupError`].
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  StoreError (this module) ← Adds context and categorization            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  LookupError (meridian-core) ← What the engine reasons about           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Host aborts the event / batch run and rolls back                      │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

use meridian_core::LookupError;

/// SQLite operation errors.
///
/// These wrap sqlx errors and categorize them, so the gateway mapping
/// into [`LookupError`] stays a simple match.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database connection failed.
    ///
    /// ## When This Occurs
    /// - Database file doesn't exist and can't be created
    /// - File permissions issue
    /// - Disk full
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    ///
    /// ## When This Occurs
    /// - Invalid SQL in migration
    /// - Migration version conflict
    #[error("migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("query failed: {0}")]
    QueryFailed(String),

    /// A row decoded into an unexpected shape.
    ///
    /// ## When This Occurs
    /// - Column type drifted from what the gateway mapping expects
    /// - NULL in a column the mapping treats as mandatory
    #[error("malformed row: {0}")]
    MalformedRow(String),

    /// Pool exhausted (all connections in use).
    #[error("connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("internal database error: {0}")]
    Internal(String),
}

/// Convert sqlx errors to StoreError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::ColumnDecode    → StoreError::MalformedRow
/// sqlx::Error::Database        → StoreError::QueryFailed
/// sqlx::Error::PoolTimedOut    → StoreError::PoolExhausted
/// sqlx::Error::PoolClosed      → StoreError::ConnectionFailed
/// Other                        → StoreError::Internal
/// ```
impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::ColumnDecode { index, source } => {
                StoreError::MalformedRow(format!("column {index}: {source}"))
            }
            sqlx::Error::ColumnNotFound(name) => {
                StoreError::MalformedRow(format!("missing column {name}"))
            }
            sqlx::Error::Database(db_err) => StoreError::QueryFailed(db_err.message().to_string()),
            sqlx::Error::PoolTimedOut => StoreError::PoolExhausted,
            sqlx::Error::PoolClosed => StoreError::ConnectionFailed("pool is closed".to_string()),
            sqlx::Error::Io(io_err) => StoreError::ConnectionFailed(io_err.to_string()),
            _ => StoreError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        StoreError::MigrationFailed(err.to_string())
    }
}

/// Convert store errors into the engine's lookup error.
///
/// The engine only distinguishes "store down", "query failed", "timed
/// out", and "bad row" - finer categories collapse accordingly.
impl From<StoreError> for LookupError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::PoolExhausted => {
                LookupError::Timeout("connection pool exhausted".to_string())
            }
            StoreError::QueryFailed(msg) => LookupError::QueryFailed(msg),
            StoreError::MalformedRow(msg) => LookupError::MalformedRow(msg),
            StoreError::ConnectionFailed(msg)
            | StoreError::MigrationFailed(msg)
            | StoreError::Internal(msg) => LookupError::Unavailable(msg),
        }
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
