//! Measures computed from recorded events.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

use crate::count::Count;
use crate::enums::StatementKind;
use crate::event::StatementEvent;

/// The value an extractor hands to a verifier.
///
/// Produced fresh for every verification cycle and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "measure", content = "value", rename_all = "snake_case")]
pub enum Measure {
    Count(Count),
    /// Statements in execution order.
    Statements(Vec<StatementEvent>),
    /// Column names in statement order; a name repeats when several
    /// statements touch it.
    Columns(Vec<String>),
    Duration(Duration),
    Analysis(SqlSummary),
}

impl Measure {
    /// Variant name, used in mismatch diagnostics.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Count(_) => "count",
            Self::Statements(_) => "statements",
            Self::Columns(_) => "columns",
            Self::Duration(_) => "duration",
            Self::Analysis(_) => "analysis",
        }
    }

    #[must_use]
    pub const fn as_count(&self) -> Option<Count> {
        match self {
            Self::Count(count) => Some(*count),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_statements(&self) -> Option<&[StatementEvent]> {
        match self {
            Self::Statements(statements) => Some(statements),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_columns(&self) -> Option<&[String]> {
        match self {
            Self::Columns(columns) => Some(columns),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_duration(&self) -> Option<Duration> {
        match self {
            Self::Duration(duration) => Some(*duration),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_analysis(&self) -> Option<&SqlSummary> {
        match self {
            Self::Analysis(summary) => Some(summary),
            _ => None,
        }
    }
}

/// Aggregate view of one test's statements, rendered by `analyze_sql`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqlSummary {
    /// Database round-trips (a physical batch counts once).
    pub executions: Count,
    pub per_kind: BTreeMap<StatementKind, Count>,
    pub max_execution_time: Duration,
    /// Select executions that repeat an earlier one exactly.
    pub exact_duplicate_selects: Count,
    /// Select shapes executed with more than one set of values.
    pub same_shape_selects: Count,
    pub unbound_statements: Count,
    pub leading_wildcard_selects: Count,
    pub non_prepared_statements: Count,
    pub max_selected_columns: Count,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_match_variant() {
        let count = Measure::Count(Count::new(2));
        assert_eq!(count.as_count(), Some(Count::new(2)));
        assert!(count.as_statements().is_none());
        assert_eq!(count.name(), "count");

        let duration = Measure::Duration(Duration::from_millis(5));
        assert_eq!(duration.as_duration(), Some(Duration::from_millis(5)));
        assert!(duration.as_count().is_none());

        let columns = Measure::Columns(vec!["id".into(), "title".into()]);
        assert_eq!(columns.as_columns().map(<[String]>::len), Some(2));
    }

    #[test]
    fn serializes_with_tag() {
        let json = serde_json::to_value(Measure::Count(Count::new(3))).unwrap();
        assert_eq!(json, serde_json::json!({"measure": "count", "value": 3}));
    }
}
