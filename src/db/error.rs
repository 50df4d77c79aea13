use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("Database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Failed to decode row: {0}")]
    Decode(String),

    /// Raised when a delete is attempted with an empty guid set. An empty
    /// identifier filter would match every row, so callers must skip the
    /// call instead.
    #[error("Refusing to delete with an empty guid set")]
    EmptyGuidSet,
}

pub type DbResult<T> = Result<T, DbError>;
