//! # Database Errors
//!
//! ```text
//! sqlx::Error / MigrateError ──► DbError ──► SyncError::DatabaseError
//!                                   │            (NotFound stays NotFound)
//!                                   └──► daemon: 500 with the detail logged
//! ```

use sqlx::error::ErrorKind;
use thiserror::Error;

/// Failures of the bridge database.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A UNIQUE constraint rejected the write (duplicate SKU, user id, ...).
    #[error("Duplicate value rejected: {constraint}")]
    UniqueViolation { constraint: String },

    /// A row points at a parent that does not exist.
    #[error("Missing referenced row: {0}")]
    ForeignKeyViolation(String),

    #[error("Could not open database: {0}")]
    ConnectionFailed(String),

    #[error("Schema migration failed: {0}")]
    MigrationFailed(String),

    /// The database stayed locked or the pool had no free connection.
    #[error("Database busy: {0}")]
    Busy(String),

    /// A JSON column could not be encoded or decoded.
    #[error("Column {column} holds invalid JSON: {reason}")]
    InvalidColumn { column: String, reason: String },

    #[error("Query failed: {0}")]
    Query(String),
}

impl DbError {
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    pub fn invalid_column(column: impl Into<String>, reason: impl ToString) -> Self {
        DbError::InvalidColumn {
            column: column.into(),
            reason: reason.to_string(),
        }
    }

    /// Whether retrying later could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, DbError::Busy(_))
    }
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Row", "query"),
            sqlx::Error::Database(db_err) => {
                let message = db_err.message().to_string();
                match db_err.kind() {
                    ErrorKind::UniqueViolation => DbError::UniqueViolation {
                        constraint: message
                            .strip_prefix("UNIQUE constraint failed: ")
                            .unwrap_or(&message)
                            .to_string(),
                    },
                    ErrorKind::ForeignKeyViolation => DbError::ForeignKeyViolation(message),
                    _ if message.contains("database is locked") => DbError::Busy(message),
                    _ => DbError::Query(message),
                }
            }
            sqlx::Error::PoolTimedOut => DbError::Busy("no free connection".to_string()),
            sqlx::Error::PoolClosed => DbError::ConnectionFailed("pool is closed".to_string()),
            other => DbError::Query(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_message() {
        assert_eq!(DbError::not_found("Order", 42).to_string(), "Order not found: 42");
    }

    #[test]
    fn test_pool_errors() {
        let busy: DbError = sqlx::Error::PoolTimedOut.into();
        assert!(busy.is_transient());

        let closed: DbError = sqlx::Error::PoolClosed.into();
        assert!(matches!(closed, DbError::ConnectionFailed(_)));
        assert!(!closed.is_transient());
    }

    #[test]
    fn test_row_not_found() {
        let err: DbError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
