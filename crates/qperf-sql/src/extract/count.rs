use qperf_core::{Count, Measure, StatementEvent, StatementKind};

use super::MeasureExtractor;

/// Counts round-trips, optionally restricted to one statement kind.
#[derive(Debug, Clone, Copy)]
pub struct CountExtractor {
    kind: Option<StatementKind>,
}

impl CountExtractor {
    #[must_use]
    pub const fn new(kind: Option<StatementKind>) -> Self {
        Self { kind }
    }
}

impl MeasureExtractor for CountExtractor {
    fn name(&self) -> &'static str {
        match self.kind {
            None => "execution_count",
            Some(StatementKind::Select) => "select_count",
            Some(StatementKind::Insert) => "insert_count",
            Some(StatementKind::Update) => "update_count",
            Some(StatementKind::Delete) => "delete_count",
            Some(StatementKind::Other) => "other_count",
        }
    }

    fn extract(&self, events: &[StatementEvent]) -> Measure {
        let count = events
            .iter()
            .filter(|e| self.kind.is_none_or(|kind| e.kind == kind))
            .count();
        Measure::Count(Count::from(count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{EXECUTION_COUNT, INSERT_COUNT, SELECT_COUNT};
    use crate::test_support::helpers::event;
    use pretty_assertions::assert_eq;

    #[test]
    fn counts_matching_kind() {
        let events = vec![
            event("SELECT 1"),
            event("INSERT INTO book VALUES (1)"),
            event("insert into book values (2)"),
            event("CREATE TABLE t (id INTEGER)"),
        ];
        assert_eq!(SELECT_COUNT.extract(&events), Measure::Count(Count::new(1)));
        assert_eq!(INSERT_COUNT.extract(&events), Measure::Count(Count::new(2)));
        assert_eq!(
            EXECUTION_COUNT.extract(&events),
            Measure::Count(Count::new(4))
        );
    }

    #[test]
    fn batch_counts_once() {
        let events = vec![event("INSERT INTO book VALUES (?)").with_batch_size(50)];
        assert_eq!(INSERT_COUNT.extract(&events), Measure::Count(Count::new(1)));
    }
}
