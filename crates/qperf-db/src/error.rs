//! Database error types for qperf-db.

use qperf_sql::InstrumentationError;
use thiserror::Error;

/// Errors from instrumented database operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// A SQL statement failed.
    #[error("Query failed: {0}")]
    Query(String),

    /// Underlying libSQL error.
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// The session rejected a notification (torn down or poisoned).
    #[error("instrumentation error: {0}")]
    Instrumentation(#[from] InstrumentationError),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
