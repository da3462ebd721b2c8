//! Errors raised by the shared database layer

use sqlx::Error as SqlxError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatabaseError {
    /// The pool could not reach the server
    #[error("Database connection error: {0}")]
    Connection(#[source] SqlxError),

    #[error("Database query error: {0}")]
    Query(#[source] SqlxError),

    #[error("Database migration error: {0}")]
    Migration(String),

    /// Bad or inconsistent `DATABASE_*` settings
    #[error("Database configuration error: {0}")]
    Configuration(String),

    /// Live tables disagree with what the service was built against
    #[error("Schema mismatch: {}", .0.join("; "))]
    SchemaMismatch(Vec<String>),
}

pub type DatabaseResult<T> = Result<T, DatabaseError>;
