use std::fmt::Write as _;

use qperf_core::{Count, PerfIssue};

use super::{PerfIssueVerifier, VerifierInput, VerifyContext, count_input};
use crate::error::SqlPerfError;
use crate::suggestion::Suggestion;

/// How the measured count relates to the declared threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// Flag only when measured > expected.
    AtMost,
    /// Flag when measured != expected.
    Exactly,
}

/// What is being counted, for message wording and hints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subject {
    Executions,
    Selects,
    Inserts,
    Updates,
    Deletes,
    SelectedColumns,
    UpdatedColumns,
    MaxSelectedColumns,
    MaxUpdatedColumns,
}

impl Subject {
    const fn noun(self) -> &'static str {
        match self {
            Self::Executions => "database execution",
            Self::Selects => "select statement",
            Self::Inserts => "insert statement",
            Self::Updates => "update statement",
            Self::Deletes => "delete statement",
            Self::SelectedColumns
            | Self::UpdatedColumns
            | Self::MaxSelectedColumns
            | Self::MaxUpdatedColumns => "column",
        }
    }

    const fn action(self) -> &'static str {
        match self {
            Self::Executions
            | Self::Selects
            | Self::Inserts
            | Self::Updates
            | Self::Deletes => "sent to the database",
            Self::SelectedColumns => "selected",
            Self::UpdatedColumns => "updated",
            Self::MaxSelectedColumns => "selected by a single statement",
            Self::MaxUpdatedColumns => "updated by a single statement",
        }
    }

    /// Hint offered when more was measured than expected.
    const fn excess_hint(self) -> Suggestion {
        match self {
            Self::Executions | Self::Selects => Suggestion::NPlusOneSelect,
            Self::Inserts | Self::Updates | Self::Deletes => Suggestion::Batching,
            Self::SelectedColumns | Self::MaxSelectedColumns => Suggestion::SelectedColumns,
            Self::UpdatedColumns | Self::MaxUpdatedColumns => Suggestion::UpdatedColumns,
        }
    }
}

/// Compares a count (or the length of a column list) with the threshold.
#[derive(Debug, Clone, Copy)]
pub struct CountVerifier {
    bound: Bound,
    subject: Subject,
}

impl CountVerifier {
    #[must_use]
    pub const fn new(bound: Bound, subject: Subject) -> Self {
        Self { bound, subject }
    }

    fn describe(&self, expected: Count, measured: Count) -> String {
        let at_most = match self.bound {
            Bound::AtMost => "at most ",
            Bound::Exactly => "",
        };
        let mut description = String::new();
        let _ = write!(
            description,
            "You may think that {at_most}<{expected}> {} {} {}\n       \
             But in fact <{measured}>...\n\n",
            expected.noun(self.subject.noun()),
            expected.verb(),
            self.subject.action(),
        );
        description
    }
}

impl PerfIssueVerifier for CountVerifier {
    fn verify(
        &self,
        ctx: &VerifyContext<'_>,
        input: VerifierInput<'_>,
    ) -> Result<PerfIssue, SqlPerfError> {
        let expected = ctx.expectation.threshold()?;
        let measured = count_input(ctx, input)?;
        let violated = match self.bound {
            Bound::AtMost => measured.is_greater_than(expected),
            Bound::Exactly => measured != expected,
        };
        if !violated {
            return Ok(PerfIssue::NONE);
        }

        let mut description = self.describe(expected, measured);
        if measured.is_greater_than(expected) {
            self.subject
                .excess_hint()
                .append_to(&mut description, ctx.frameworks);
        }
        Ok(PerfIssue::new(description))
    }
}
