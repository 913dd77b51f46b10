use std::fmt::Write as _;

use qperf_core::{Measure, PerfIssue};

use super::{PerfIssueVerifier, VerifierInput, VerifyContext, mismatch};
use crate::error::SqlPerfError;

/// Never flags; renders the SQL summary as a report.
#[derive(Debug, Clone, Copy)]
pub struct AnalyzeSqlVerifier;

impl PerfIssueVerifier for AnalyzeSqlVerifier {
    fn verify(
        &self,
        ctx: &VerifyContext<'_>,
        input: VerifierInput<'_>,
    ) -> Result<PerfIssue, SqlPerfError> {
        match input {
            VerifierInput::Measure(Measure::Analysis(_)) => Ok(PerfIssue::NONE),
            other => Err(mismatch(ctx, "analysis", other)),
        }
    }

    fn report(
        &self,
        ctx: &VerifyContext<'_>,
        input: VerifierInput<'_>,
    ) -> Result<Option<String>, SqlPerfError> {
        let VerifierInput::Measure(Measure::Analysis(summary)) = input else {
            return Err(mismatch(ctx, "analysis", input));
        };
        let mut report = String::from("[qperf] SQL analysis\n");
        let _ = writeln!(report, "  executions: {}", summary.executions);
        for (kind, count) in &summary.per_kind {
            let _ = writeln!(report, "    {kind}: {count}");
        }
        let _ = writeln!(report, "  slowest statement: {:?}", summary.max_execution_time);
        let _ = writeln!(report, "  max selected columns: {}", summary.max_selected_columns);

        let findings = [
            (summary.exact_duplicate_selects, "repeated identical select(s)"),
            (summary.same_shape_selects, "select shape(s) run with different values"),
            (summary.unbound_statements, "statement(s) without bind parameters"),
            (summary.leading_wildcard_selects, "select(s) with a leading-wildcard LIKE"),
            (summary.non_prepared_statements, "statement(s) sent unprepared"),
        ];
        let flagged: Vec<_> = findings
            .iter()
            .filter(|(count, _)| !count.is_zero())
            .collect();
        if flagged.is_empty() {
            report.push_str("  no suspicious pattern found\n");
        } else {
            for (count, label) in flagged {
                let _ = writeln!(report, "  * {count} {label}");
            }
        }
        Ok(Some(report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{MeasureExtractor, SQL_ANALYSIS};
    use crate::framework::NoFrameworks;
    use crate::test_support::helpers::event;
    use qperf_config::DisplayConfig;
    use qperf_core::{Expectation, ExpectationKind};

    #[test]
    fn reports_without_flagging() {
        let events = vec![
            event("SELECT * FROM book WHERE id = 1"),
            event("SELECT * FROM book WHERE id = 1"),
        ];
        let measure = SQL_ANALYSIS.extract(&events);
        let display = DisplayConfig::default();
        let expectation = Expectation::of(ExpectationKind::AnalyzeSql);
        let ctx = VerifyContext {
            expectation: &expectation,
            frameworks: &NoFrameworks,
            display: &display,
        };

        let input = VerifierInput::Measure(&measure);
        assert!(AnalyzeSqlVerifier.verify(&ctx, input).unwrap().is_none());
        let report = AnalyzeSqlVerifier.report(&ctx, input).unwrap().unwrap();
        assert!(report.contains("executions: 2"));
        assert!(report.contains("select: 2"));
        assert!(report.contains("* 1 repeated identical select(s)"));
        assert!(report.contains("* 2 statement(s) without bind parameters"));
    }
}
