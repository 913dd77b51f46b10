//! Engine error types for qperf-sql.
//!
//! Performance issues are not errors: verifiers return `PerfIssue` values.
//! The variants below cover test-authoring defects (unknown or malformed
//! declarations), miswired instrumentation, and the final conversion of a
//! non-empty issue list into a failure via `VerificationOutcome::into_result`.

use qperf_core::{CoreError, ExpectationKind};
use thiserror::Error;

/// Ordering errors raised by the recording side.
#[derive(Debug, Error)]
pub enum InstrumentationError {
    /// A notification arrived after the session was finalized.
    #[error("{what} received after teardown")]
    EventAfterTeardown { what: &'static str },

    /// A thread panicked while holding the recording state.
    #[error("Recording state is poisoned")]
    StatePoisoned,
}

/// Errors from activation, verification and reporting.
#[derive(Debug, Error)]
pub enum SqlPerfError {
    /// The registry has no entry for the declared kind.
    #[error("Unknown expectation: {0}")]
    UnknownExpectation(ExpectationKind),

    /// A declaration's parameters are malformed.
    #[error("Invalid expectation declaration: {0}")]
    InvalidDeclaration(#[from] CoreError),

    /// A registry entry breaks the recorder/extractor/verifier invariants.
    #[error("Invalid registry entry for '{kind}': {reason}")]
    InvalidRegistry {
        kind: ExpectationKind,
        reason: &'static str,
    },

    /// The instrumentation collaborator is miswired.
    #[error(transparent)]
    Instrumentation(#[from] InstrumentationError),

    /// A verifier received a measure of the wrong shape.
    #[error("Verifier for '{kind}' expected a {expected} measure but received {found}")]
    MeasureMismatch {
        kind: ExpectationKind,
        expected: &'static str,
        found: &'static str,
    },

    /// Verification found performance issues.
    #[error("{count} performance issue(s) found\n\n{report}")]
    PerfIssues { count: usize, report: String },

    /// Catch-all for unexpected errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
