use qperf_core::{Measure, PerfIssue};

use super::{PerfIssueVerifier, VerifierInput, VerifyContext, mismatch};
use crate::error::SqlPerfError;

/// Flags when the slowest statement took longer than the declared maximum.
#[derive(Debug, Clone, Copy)]
pub struct ExecutionTimeVerifier;

impl PerfIssueVerifier for ExecutionTimeVerifier {
    fn verify(
        &self,
        ctx: &VerifyContext<'_>,
        input: VerifierInput<'_>,
    ) -> Result<PerfIssue, SqlPerfError> {
        let VerifierInput::Measure(Measure::Duration(measured)) = input else {
            return Err(mismatch(ctx, "duration", input));
        };
        let max = ctx.expectation.max_duration()?;
        if *measured <= max {
            return Ok(PerfIssue::NONE);
        }
        Ok(PerfIssue::new(format!(
            "Query execution time is greater than expected\n\n\
             \tExpected at most: {max:?}\n\
             \tSlowest statement: {measured:?}\n"
        )))
    }
}
