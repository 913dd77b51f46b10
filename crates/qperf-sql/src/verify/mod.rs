//! Perf issue verifiers.
//!
//! A verifier compares one expectation with the measure extracted for it (or,
//! for the leak and batching checks, with the recorder state directly) and
//! returns [`PerfIssue::NONE`] or an issue with a rendered explanation.
//! Verifiers are stateless: running one twice on the same input gives the
//! same text.

mod analyze;
mod batch;
mod duplicates;
mod leak;
mod statements;
mod threshold;
mod time;

pub use analyze::AnalyzeSqlVerifier;
pub use batch::BatchingVerifier;
pub use duplicates::{SameSelectTypesVerifier, SameSelectsVerifier};
pub use leak::ConnectionLeakVerifier;
pub use statements::{StatementCheck, StatementListVerifier};
pub use threshold::{Bound, CountVerifier, Subject};
pub use time::ExecutionTimeVerifier;

use qperf_config::DisplayConfig;
use qperf_core::{Count, Expectation, Measure, PerfIssue, StatementEvent};

use crate::error::SqlPerfError;
use crate::framework::FrameworkCapabilities;
use crate::recorder::Recorder;

/// Everything a verifier may read besides its input.
#[derive(Clone, Copy)]
pub struct VerifyContext<'a> {
    pub expectation: &'a Expectation,
    pub frameworks: &'a dyn FrameworkCapabilities,
    pub display: &'a DisplayConfig,
}

#[derive(Debug, Clone, Copy)]
pub enum VerifierInput<'a> {
    Measure(&'a Measure),
    /// For checks with no extractor, which read recorder state directly.
    Recorder(&'a Recorder),
}

impl VerifierInput<'_> {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Measure(measure) => measure.name(),
            Self::Recorder(recorder) => recorder.name(),
        }
    }
}

pub trait PerfIssueVerifier: Send + Sync {
    /// # Errors
    ///
    /// Returns `SqlPerfError::MeasureMismatch` when wired to the wrong input
    /// and `SqlPerfError::InvalidDeclaration` for unusable parameters.
    fn verify(
        &self,
        ctx: &VerifyContext<'_>,
        input: VerifierInput<'_>,
    ) -> Result<PerfIssue, SqlPerfError>;

    /// Informational output independent of the verdict.
    ///
    /// # Errors
    ///
    /// Same as [`PerfIssueVerifier::verify`].
    fn report(
        &self,
        _ctx: &VerifyContext<'_>,
        _input: VerifierInput<'_>,
    ) -> Result<Option<String>, SqlPerfError> {
        Ok(None)
    }
}

fn mismatch(
    ctx: &VerifyContext<'_>,
    expected: &'static str,
    input: VerifierInput<'_>,
) -> SqlPerfError {
    SqlPerfError::MeasureMismatch {
        kind: ctx.expectation.kind,
        expected,
        found: input.name(),
    }
}

/// The count carried by a count or column-list measure.
fn count_input(ctx: &VerifyContext<'_>, input: VerifierInput<'_>) -> Result<Count, SqlPerfError> {
    match input {
        VerifierInput::Measure(Measure::Count(count)) => Ok(*count),
        VerifierInput::Measure(Measure::Columns(columns)) => Ok(Count::from(columns.len())),
        other => Err(mismatch(ctx, "count", other)),
    }
}

fn statements_input<'a>(
    ctx: &VerifyContext<'_>,
    input: VerifierInput<'a>,
) -> Result<&'a [StatementEvent], SqlPerfError> {
    match input {
        VerifierInput::Measure(Measure::Statements(events)) => Ok(events),
        other => Err(mismatch(ctx, "statements", other)),
    }
}
