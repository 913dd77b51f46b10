use qperf_core::{Measure, StatementEvent, StatementKind};

use super::MeasureExtractor;
use crate::analysis::AnalyzedStatement;

/// Which statements a [`StatementsExtractor`] keeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementFilter {
    Selects,
    /// Statements with values inlined where a bind parameter belongs.
    Unbound,
    /// Selects with a `LIKE` pattern starting with `%` or `_`.
    LeadingWildcardSelects,
    /// Statements sent as plain text without a prepare step.
    NonPrepared,
}

impl StatementFilter {
    #[must_use]
    pub fn matches(self, event: &StatementEvent) -> bool {
        match self {
            Self::Selects => event.kind == StatementKind::Select,
            Self::Unbound => !AnalyzedStatement::new(event).inline_literals().is_empty(),
            Self::LeadingWildcardSelects => {
                event.kind == StatementKind::Select
                    && AnalyzedStatement::new(event).has_leading_wildcard_like()
            }
            Self::NonPrepared => !event.prepared,
        }
    }
}

/// Keeps the subset of statements matching a filter, in execution order.
#[derive(Debug, Clone, Copy)]
pub struct StatementsExtractor {
    filter: StatementFilter,
}

impl StatementsExtractor {
    #[must_use]
    pub const fn new(filter: StatementFilter) -> Self {
        Self { filter }
    }
}

impl MeasureExtractor for StatementsExtractor {
    fn name(&self) -> &'static str {
        match self.filter {
            StatementFilter::Selects => "select_statements",
            StatementFilter::Unbound => "unbound_statements",
            StatementFilter::LeadingWildcardSelects => "leading_wildcard_selects",
            StatementFilter::NonPrepared => "non_prepared_statements",
        }
    }

    fn extract(&self, events: &[StatementEvent]) -> Measure {
        Measure::Statements(
            events
                .iter()
                .filter(|e| self.filter.matches(e))
                .cloned()
                .collect(),
        )
    }
}
