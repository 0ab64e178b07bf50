//! Datastore layer: the `Resource` seam plus the SQLite implementation

pub mod resource;
pub mod sqlite;

pub use resource::Resource;
pub use sqlite::SqliteStore;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    /// Schema constraint violation surfaced on create/update
    #[error("{0}")]
    Validation(String),

    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("blocking task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Map write failures: constraint violations are the schema layer rejecting
/// the payload, everything else is a driver error.
pub(crate) fn write_error(err: rusqlite::Error) -> StoreError {
    match err {
        rusqlite::Error::SqliteFailure(code, Some(msg))
            if code.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            StoreError::Validation(format!("Constraint violation: {}", msg))
        }
        other => StoreError::Sqlite(other),
    }
}
