//! # Store Errors
//!
//! ```text
//! sqlx::Error ──────────┐
//! MigrateError ─────────┼──► DbError ──► AppError (generic text, detail logged)
//! serde_json::Error ────┘
//! ```

use sqlx::error::ErrorKind;
use thiserror::Error;

/// Local storage failures.
#[derive(Debug, Error)]
pub enum DbError {
    /// The database file could not be created or opened.
    #[error("Cannot open local store: {0}")]
    Open(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    /// A query expected a row and got none.
    #[error("No matching row")]
    NotFound,

    /// Unique, foreign key, not-null or check constraint.
    #[error("Constraint violated: {0}")]
    Constraint(String),

    /// Every connection stayed busy past the acquire timeout.
    #[error("Local store busy")]
    Busy,

    #[error("Query failed: {0}")]
    Query(String),

    /// A cart line's product snapshot could not be written or read back.
    #[error("Stored snapshot unreadable: {0}")]
    Snapshot(#[from] serde_json::Error),
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound,
            sqlx::Error::PoolTimedOut => DbError::Busy,
            sqlx::Error::PoolClosed => DbError::Open("store already closed".to_string()),
            sqlx::Error::Io(e) => DbError::Open(e.to_string()),
            sqlx::Error::Database(db_err) => match db_err.kind() {
                ErrorKind::UniqueViolation
                | ErrorKind::ForeignKeyViolation
                | ErrorKind::NotNullViolation
                | ErrorKind::CheckViolation => DbError::Constraint(db_err.message().to_string()),
                _ => DbError::Query(db_err.message().to_string()),
            },
            other => DbError::Query(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::Migration(err.to_string())
    }
}

pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};

    #[test]
    fn test_pool_errors() {
        assert!(matches!(DbError::from(sqlx::Error::RowNotFound), DbError::NotFound));
        assert!(matches!(DbError::from(sqlx::Error::PoolTimedOut), DbError::Busy));
        assert!(matches!(DbError::from(sqlx::Error::PoolClosed), DbError::Open(_)));
    }

    #[test]
    fn test_json_error_converts() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: DbError = json_err.into();
        assert!(err.to_string().starts_with("Stored snapshot unreadable"));
    }

    #[tokio::test]
    async fn test_constraint_violation_is_classified() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        sqlx::query("CREATE TABLE t (id TEXT PRIMARY KEY)")
            .execute(db.pool())
            .await
            .unwrap();
        sqlx::query("INSERT INTO t VALUES ('a')")
            .execute(db.pool())
            .await
            .unwrap();

        let err: DbError = sqlx::query("INSERT INTO t VALUES ('a')")
            .execute(db.pool())
            .await
            .unwrap_err()
            .into();
        assert!(matches!(err, DbError::Constraint(_)));
    }
}
