use std::fmt::Write as _;

use qperf_core::PerfIssue;

use super::{PerfIssueVerifier, VerifierInput, VerifyContext, statements_input};
use crate::analysis::groups::{exact_duplicate_selects, same_shape_different_values};
use crate::error::SqlPerfError;
use crate::render::{render_statements, truncate_sql};
use crate::suggestion::Suggestion;

/// Flags select statements executed more than once with identical text and values.
#[derive(Debug, Clone, Copy)]
pub struct SameSelectsVerifier;

impl PerfIssueVerifier for SameSelectsVerifier {
    fn verify(
        &self,
        ctx: &VerifyContext<'_>,
        input: VerifierInput<'_>,
    ) -> Result<PerfIssue, SqlPerfError> {
        let selects = statements_input(ctx, input)?;
        let groups = exact_duplicate_selects(selects);
        if groups.is_empty() {
            return Ok(PerfIssue::NONE);
        }

        let mut description = String::from("Same SELECT statements\n\n");
        for group in &groups {
            let _ = writeln!(
                description,
                "\t{} times: {}",
                group.executions.len(),
                truncate_sql(&group.sql, ctx.display.max_sql_length)
            );
            let first = group.executions.iter().take(1).copied();
            description.push_str(&render_statements(first, ctx.display));
        }
        description.push('\n');
        Suggestion::NPlusOneSelect.append_to(&mut description, ctx.frameworks);
        Ok(PerfIssue::new(description))
    }
}

/// Flags select shapes executed repeatedly with different values.
#[derive(Debug, Clone, Copy)]
pub struct SameSelectTypesVerifier;

impl PerfIssueVerifier for SameSelectTypesVerifier {
    fn verify(
        &self,
        ctx: &VerifyContext<'_>,
        input: VerifierInput<'_>,
    ) -> Result<PerfIssue, SqlPerfError> {
        let selects = statements_input(ctx, input)?;
        let groups = same_shape_different_values(selects);
        if groups.is_empty() {
            return Ok(PerfIssue::NONE);
        }

        let mut description =
            String::from("Same SELECT types with different parameter values\n\n");
        for group in &groups {
            let _ = writeln!(
                description,
                "\t{} executions with {} different value sets: {}",
                group.executions.len(),
                group.distinct_values,
                truncate_sql(&group.shape, ctx.display.max_sql_length)
            );
        }
        description.push('\n');
        Suggestion::NPlusOneSelect.append_to(&mut description, ctx.frameworks);
        Ok(PerfIssue::new(description))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::NoFrameworks;
    use crate::test_support::helpers::statement;
    use qperf_config::DisplayConfig;
    use qperf_core::{Expectation, ExpectationKind, Measure, ParamValue, StatementEvent};

    fn by_id(id: i64) -> StatementEvent {
        statement(
            "SELECT * FROM book WHERE id = ?",
            vec![ParamValue::Integer(id)],
        )
    }

    fn check(
        verifier: &dyn PerfIssueVerifier,
        kind: ExpectationKind,
        events: Vec<StatementEvent>,
    ) -> PerfIssue {
        let display = DisplayConfig::default();
        let expectation = Expectation::of(kind);
        let ctx = VerifyContext {
            expectation: &expectation,
            frameworks: &NoFrameworks,
            display: &display,
        };
        let measure = Measure::Statements(events);
        verifier
            .verify(&ctx, VerifierInput::Measure(&measure))
            .unwrap()
    }

    fn same_selects(events: Vec<StatementEvent>) -> PerfIssue {
        check(
            &SameSelectsVerifier,
            ExpectationKind::DisableSameSelects,
            events,
        )
    }

    fn same_select_types(events: Vec<StatementEvent>) -> PerfIssue {
        check(
            &SameSelectTypesVerifier,
            ExpectationKind::DisableSameSelectTypesWithDifferentParamValues,
            events,
        )
    }

    #[test]
    fn identical_values_flag_only_same_selects() {
        let events = vec![by_id(1), by_id(1)];
        let same = same_selects(events.clone());
        let types = same_select_types(events);
        assert!(same.is_issue());
        let text = same.description().unwrap();
        assert!(text.contains("2 times: select * from book where id = ?"));
        assert!(types.is_none());
    }

    #[test]
    fn different_values_flag_only_select_types() {
        let events = vec![by_id(1), by_id(2)];
        let same = same_selects(events.clone());
        let types = same_select_types(events);
        assert!(same.is_none());
        assert!(types.is_issue());
        let text = types.description().unwrap();
        assert!(text.contains("2 executions with 2 different value sets"));
    }

    #[test]
    fn single_execution_is_clean() {
        assert!(same_selects(vec![by_id(1)]).is_none());
    }
}
