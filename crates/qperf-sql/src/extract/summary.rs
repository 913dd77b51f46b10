use std::collections::BTreeMap;

use qperf_core::measure::SqlSummary;
use qperf_core::{Count, Measure, StatementEvent, StatementKind};

use super::{MeasureExtractor, StatementFilter};
use crate::analysis::AnalyzedStatement;
use crate::analysis::groups::{exact_duplicate_selects, same_shape_different_values};

/// Aggregates every analysis pass into one [`SqlSummary`].
#[derive(Debug, Clone, Copy)]
pub struct SqlAnalysisExtractor;

impl MeasureExtractor for SqlAnalysisExtractor {
    fn name(&self) -> &'static str {
        "sql_analysis"
    }

    fn extract(&self, events: &[StatementEvent]) -> Measure {
        let mut per_kind: BTreeMap<StatementKind, Count> = BTreeMap::new();
        for kind in StatementKind::ALL {
            let n = events.iter().filter(|e| e.kind == kind).count();
            if n > 0 {
                per_kind.insert(kind, Count::from(n));
            }
        }
        let count_matching = |filter: StatementFilter| {
            Count::from(events.iter().filter(|e| filter.matches(e)).count())
        };
        let duplicates: usize = exact_duplicate_selects(events)
            .iter()
            .map(|g| g.executions.len() - 1)
            .sum();

        Measure::Analysis(SqlSummary {
            executions: Count::from(events.len()),
            per_kind,
            max_execution_time: events
                .iter()
                .map(StatementEvent::elapsed)
                .max()
                .unwrap_or_default(),
            exact_duplicate_selects: Count::from(duplicates),
            same_shape_selects: Count::from(same_shape_different_values(events).len()),
            unbound_statements: count_matching(StatementFilter::Unbound),
            leading_wildcard_selects: count_matching(StatementFilter::LeadingWildcardSelects),
            non_prepared_statements: count_matching(StatementFilter::NonPrepared),
            max_selected_columns: Count::from(
                events
                    .iter()
                    .map(|e| AnalyzedStatement::new(e).selected_columns().len())
                    .max()
                    .unwrap_or(0),
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{event, statement};
    use pretty_assertions::assert_eq;
    use qperf_core::ParamValue;

    #[test]
    fn summarizes_every_pass() {
        let by_id = |id| {
            statement(
                "SELECT id, title FROM book WHERE id = ?",
                vec![ParamValue::Integer(id)],
            )
        };
        let events = vec![
            by_id(1),
            by_id(1),
            by_id(2),
            event("SELECT * FROM book WHERE title LIKE '%x'"),
            event("INSERT INTO book (id) VALUES (9)").with_prepared(false),
        ];
        let measure = SqlAnalysisExtractor.extract(&events);
        let summary = measure.as_analysis().unwrap();

        assert_eq!(summary.executions, Count::new(5));
        assert_eq!(
            summary.per_kind.get(&StatementKind::Select),
            Some(&Count::new(4))
        );
        assert_eq!(
            summary.per_kind.get(&StatementKind::Insert),
            Some(&Count::new(1))
        );
        assert_eq!(summary.exact_duplicate_selects, Count::new(1));
        assert_eq!(summary.same_shape_selects, Count::new(1));
        assert_eq!(summary.unbound_statements, Count::new(2));
        assert_eq!(summary.leading_wildcard_selects, Count::new(1));
        assert_eq!(summary.non_prepared_statements, Count::new(1));
        assert_eq!(summary.max_selected_columns, Count::new(2));
    }
}
