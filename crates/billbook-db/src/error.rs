//! # Database Errors
//!
//! ```text
//! sqlx::Error ──► DbError ──► AppError (CLI) ──► "error: ..." on stderr
//!                    ▲
//! ValidationError ───┘  (payments and preview saves checked by the core)
//! ```

use billbook_core::ValidationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    /// No row with that id (or it was deleted).
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A UNIQUE index rejected the write, e.g. two invoices numbered in
    /// the same millisecond.
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// A reference points at a missing row (settings → bank account).
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    /// A CHECK or NOT NULL constraint rejected the write.
    #[error("Constraint failed: {0}")]
    ConstraintViolation(String),

    #[error("Could not open database: {0}")]
    ConnectionFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// A JSON column could not be read or written.
    #[error("Corrupt stored data: {0}")]
    Serialization(String),

    /// A read-modify-write was rejected by the domain rules.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Timed out waiting for a database connection")]
    PoolTimedOut,

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

    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// Sorts SQLite failures by the constraint named in the message:
///
/// ```text
/// "UNIQUE constraint failed: invoices.invoice_number" → UniqueViolation
/// "FOREIGN KEY constraint failed"                     → ForeignKeyViolation
/// "CHECK constraint failed: ..." / "NOT NULL ..."     → ConstraintViolation
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Record", "unknown"),
            sqlx::Error::Database(db_err) => {
                let msg = db_err.message();
                if let Some(column) = msg.strip_prefix("UNIQUE constraint failed: ") {
                    DbError::UniqueViolation {
                        field: column.to_string(),
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("FOREIGN KEY constraint failed") {
                    DbError::ForeignKeyViolation {
                        message: msg.to_string(),
                    }
                } else if msg.contains("constraint failed") {
                    DbError::ConstraintViolation(msg.to_string())
                } else {
                    DbError::QueryFailed(msg.to_string())
                }
            }
            sqlx::Error::PoolTimedOut => DbError::PoolTimedOut,
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

impl From<serde_json::Error> for DbError {
    fn from(err: serde_json::Error) -> Self {
        DbError::Serialization(err.to_string())
    }
}

pub type DbResult<T> = Result<T, DbError>;
