use qperf_core::{Count, Measure, StatementEvent};

use super::MeasureExtractor;
use crate::analysis::AnalyzedStatement;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnTarget {
    Selected,
    Updated,
}

/// "number" family: every column of every statement.
/// "max" family: the largest column count of a single statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnAggregate {
    All,
    MaxPerStatement,
}

#[derive(Debug, Clone, Copy)]
pub struct ColumnsExtractor {
    target: ColumnTarget,
    aggregate: ColumnAggregate,
}

impl ColumnsExtractor {
    #[must_use]
    pub const fn new(target: ColumnTarget, aggregate: ColumnAggregate) -> Self {
        Self { target, aggregate }
    }

    fn columns_of(&self, event: &StatementEvent) -> Vec<String> {
        let analyzed = AnalyzedStatement::new(event);
        match self.target {
            ColumnTarget::Selected => analyzed.selected_columns(),
            ColumnTarget::Updated => analyzed.updated_columns(),
        }
    }
}

impl MeasureExtractor for ColumnsExtractor {
    fn name(&self) -> &'static str {
        match (self.target, self.aggregate) {
            (ColumnTarget::Selected, ColumnAggregate::All) => "selected_columns",
            (ColumnTarget::Selected, ColumnAggregate::MaxPerStatement) => "max_selected_columns",
            (ColumnTarget::Updated, ColumnAggregate::All) => "updated_columns",
            (ColumnTarget::Updated, ColumnAggregate::MaxPerStatement) => "max_updated_columns",
        }
    }

    fn extract(&self, events: &[StatementEvent]) -> Measure {
        match self.aggregate {
            ColumnAggregate::All => {
                Measure::Columns(events.iter().flat_map(|e| self.columns_of(e)).collect())
            }
            ColumnAggregate::MaxPerStatement => {
                let max = events
                    .iter()
                    .map(|e| self.columns_of(e).len())
                    .max()
                    .unwrap_or(0);
                Measure::Count(Count::from(max))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{
        MAX_SELECTED_COLUMNS, MAX_UPDATED_COLUMNS, SELECTED_COLUMNS, UPDATED_COLUMNS,
    };
    use crate::test_support::helpers::event;
    use pretty_assertions::assert_eq;

    fn events() -> Vec<StatementEvent> {
        vec![
            event("SELECT id, title, isbn FROM book"),
            event("SELECT id FROM author"),
            event("UPDATE book SET title = ?, isbn = ? WHERE id = ?"),
        ]
    }

    #[test]
    fn selected_family() {
        let events = events();
        assert_eq!(
            SELECTED_COLUMNS.extract(&events),
            Measure::Columns(vec!["id".into(), "title".into(), "isbn".into(), "id".into()])
        );
        assert_eq!(
            MAX_SELECTED_COLUMNS.extract(&events),
            Measure::Count(Count::new(3))
        );
    }

    #[test]
    fn updated_family() {
        let events = events();
        assert_eq!(
            UPDATED_COLUMNS.extract(&events),
            Measure::Columns(vec!["title".into(), "isbn".into()])
        );
        assert_eq!(
            MAX_UPDATED_COLUMNS.extract(&events),
            Measure::Count(Count::new(2))
        );
        assert_eq!(
            MAX_UPDATED_COLUMNS.extract(&[]),
            Measure::Count(Count::ZERO)
        );
    }
}
