//! Cross-cutting error types for qperf.
//!
//! Only errors that can originate from the value types themselves live here.
//! Engine errors (`SqlPerfError`, `InstrumentationError`) and configuration
//! errors are defined in their respective crates.

use thiserror::Error;

use crate::enums::ExpectationKind;

/// Errors raised while building or validating core values.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A required expectation parameter was not supplied.
    #[error("Expectation '{kind}' requires the '{parameter}' parameter")]
    MissingParameter {
        kind: ExpectationKind,
        parameter: &'static str,
    },

    /// An expectation parameter was supplied but is not acceptable.
    #[error("Invalid '{parameter}' for expectation '{kind}': {reason}")]
    InvalidParameter {
        kind: ExpectationKind,
        parameter: &'static str,
        reason: String,
    },

    /// Data failed validation (unknown names, malformed values).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
