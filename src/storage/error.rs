//! Storage Errors
//!
//! Error types for repository operations.

/// Errors that can occur in the storage layer
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Unique constraint on payment reference rejected the write
    #[error("Payment reference already exists: {0}")]
    DuplicateReference(String),

    /// Unique constraint on student number rejected the write
    #[error("Student number already exists: {0}")]
    DuplicateStudent(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Check whether a sqlx error is a unique constraint violation
pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.is_unique_violation(),
        _ => false,
    }
}
