//! Expectation declarations: a kind plus its parameters.
//!
//! Declarations arrive from test code (constructors below) or from
//! configuration files (serde). Either way they go through
//! [`Expectation::validate`] before a pipeline is activated, so a malformed
//! parameter is reported as a test-authoring defect up front.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::count::Count;
use crate::enums::{ExpectationKind, TimeUnit};
use crate::errors::CoreError;

/// How an expectation kind uses the `value` parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueRule {
    /// No parameters accepted.
    NoValue,
    /// A non-negative value is mandatory.
    Required,
    /// A positive value may be given.
    OptionalPositive,
}

impl ValueRule {
    #[must_use]
    pub const fn for_kind(kind: ExpectationKind) -> Self {
        use ExpectationKind as K;
        match kind {
            K::ExpectJdbcQueryExecution
            | K::ExpectMaxJdbcQueryExecution
            | K::ExpectSelect
            | K::ExpectMaxSelect
            | K::ExpectInsert
            | K::ExpectMaxInsert
            | K::ExpectUpdate
            | K::ExpectMaxUpdate
            | K::ExpectDelete
            | K::ExpectMaxDelete
            | K::ExpectSelectedColumn
            | K::ExpectMaxSelectedColumn
            | K::ExpectUpdatedColumn
            | K::ExpectMaxUpdatedColumn
            | K::ExpectMaxQueryExecutionTime => Self::Required,
            K::ExpectJdbcBatching => Self::OptionalPositive,
            _ => Self::NoValue,
        }
    }
}

/// One declared constraint on a test.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Expectation {
    pub kind: ExpectationKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<TimeUnit>,
}

impl Expectation {
    /// A declaration without parameters.
    #[must_use]
    pub const fn of(kind: ExpectationKind) -> Self {
        Self {
            kind,
            value: None,
            unit: None,
        }
    }

    /// A declaration with a count threshold.
    #[must_use]
    pub fn with_threshold(kind: ExpectationKind, value: u64) -> Self {
        Self {
            kind,
            value: Some(i64::try_from(value).unwrap_or(i64::MAX)),
            unit: None,
        }
    }

    #[must_use]
    pub fn max_select(n: u64) -> Self {
        Self::with_threshold(ExpectationKind::ExpectMaxSelect, n)
    }

    #[must_use]
    pub fn select(n: u64) -> Self {
        Self::with_threshold(ExpectationKind::ExpectSelect, n)
    }

    #[must_use]
    pub fn max_insert(n: u64) -> Self {
        Self::with_threshold(ExpectationKind::ExpectMaxInsert, n)
    }

    #[must_use]
    pub fn insert(n: u64) -> Self {
        Self::with_threshold(ExpectationKind::ExpectInsert, n)
    }

    #[must_use]
    pub fn max_update(n: u64) -> Self {
        Self::with_threshold(ExpectationKind::ExpectMaxUpdate, n)
    }

    #[must_use]
    pub fn update(n: u64) -> Self {
        Self::with_threshold(ExpectationKind::ExpectUpdate, n)
    }

    #[must_use]
    pub fn max_delete(n: u64) -> Self {
        Self::with_threshold(ExpectationKind::ExpectMaxDelete, n)
    }

    #[must_use]
    pub fn delete(n: u64) -> Self {
        Self::with_threshold(ExpectationKind::ExpectDelete, n)
    }

    #[must_use]
    pub fn max_query_execution_time(amount: u64, unit: TimeUnit) -> Self {
        Self {
            unit: Some(unit),
            ..Self::with_threshold(ExpectationKind::ExpectMaxQueryExecutionTime, amount)
        }
    }

    #[must_use]
    pub fn jdbc_batching(batch_size: Option<u32>) -> Self {
        Self {
            kind: ExpectationKind::ExpectJdbcBatching,
            value: batch_size.map(i64::from),
            unit: None,
        }
    }

    /// Check the parameters against the kind's rule.
    ///
    /// # Errors
    ///
    /// Returns `CoreError::MissingParameter` when a required value is absent
    /// and `CoreError::InvalidParameter` for negative values or parameters
    /// the kind does not accept.
    pub fn validate(&self) -> Result<(), CoreError> {
        match (ValueRule::for_kind(self.kind), self.value) {
            (ValueRule::Required, None) => {
                return Err(CoreError::MissingParameter {
                    kind: self.kind,
                    parameter: "value",
                });
            }
            (ValueRule::Required, Some(v)) if v < 0 => {
                return Err(self.invalid("value", format!("must not be negative, got {v}")));
            }
            (ValueRule::OptionalPositive, Some(v)) if v <= 0 => {
                return Err(self.invalid("value", format!("must be positive, got {v}")));
            }
            (ValueRule::NoValue, Some(v)) => {
                return Err(self.invalid("value", format!("takes no value, got {v}")));
            }
            _ => {}
        }
        if self.unit.is_some() && self.kind != ExpectationKind::ExpectMaxQueryExecutionTime {
            return Err(self.invalid("unit", "only time thresholds take a unit".to_string()));
        }
        Ok(())
    }

    /// The count threshold.
    ///
    /// # Errors
    ///
    /// Returns `CoreError` if the value is missing or negative.
    pub fn threshold(&self) -> Result<Count, CoreError> {
        let value = self.value.ok_or(CoreError::MissingParameter {
            kind: self.kind,
            parameter: "value",
        })?;
        u64::try_from(value)
            .map(Count::new)
            .map_err(|_| self.invalid("value", format!("must not be negative, got {value}")))
    }

    /// The time threshold, converted with `unit` (milliseconds by default).
    ///
    /// # Errors
    ///
    /// Returns `CoreError` if the value is missing or negative.
    pub fn max_duration(&self) -> Result<Duration, CoreError> {
        let amount = self.threshold()?.value();
        Ok(self.unit.unwrap_or_default().to_duration(amount))
    }

    /// Expected physical batch size, if one was declared.
    #[must_use]
    pub fn batch_size(&self) -> Option<u32> {
        self.value.and_then(|v| u32::try_from(v).ok()).filter(|n| *n > 0)
    }

    fn invalid(&self, parameter: &'static str, reason: String) -> CoreError {
        CoreError::InvalidParameter {
            kind: self.kind,
            parameter,
            reason,
        }
    }
}

impl fmt::Display for Expectation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.value, self.unit) {
            (Some(value), Some(unit)) => write!(f, "{}({value} {unit})", self.kind),
            (Some(value), None) => write!(f, "{}({value})", self.kind),
            _ => write!(f, "{}", self.kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn threshold_kinds_require_value() {
        let err = Expectation::of(ExpectationKind::ExpectMaxSelect)
            .validate()
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::MissingParameter {
                parameter: "value",
                ..
            }
        ));
    }

    #[test]
    fn negative_threshold_is_invalid() {
        let expectation = Expectation {
            kind: ExpectationKind::ExpectMaxInsert,
            value: Some(-1),
            unit: None,
        };
        assert!(matches!(
            expectation.validate(),
            Err(CoreError::InvalidParameter { .. })
        ));
        assert!(expectation.threshold().is_err());
    }

    #[test]
    fn flags_reject_values() {
        let expectation = Expectation {
            kind: ExpectationKind::DisableSameSelects,
            value: Some(2),
            unit: None,
        };
        assert!(expectation.validate().is_err());
        Expectation::of(ExpectationKind::DisableSameSelects)
            .validate()
            .unwrap();
    }

    #[test]
    fn unit_only_for_time_thresholds() {
        let expectation = Expectation {
            unit: Some(TimeUnit::Seconds),
            ..Expectation::max_select(1)
        };
        assert!(expectation.validate().is_err());
        Expectation::max_query_execution_time(20, TimeUnit::Seconds)
            .validate()
            .unwrap();
    }

    #[test]
    fn batching_size_is_optional_but_positive() {
        Expectation::jdbc_batching(None).validate().unwrap();
        Expectation::jdbc_batching(Some(30)).validate().unwrap();
        assert_eq!(Expectation::jdbc_batching(Some(30)).batch_size(), Some(30));
        assert!(Expectation::jdbc_batching(Some(0)).validate().is_err());
    }

    #[test]
    fn max_duration_defaults_to_milliseconds() {
        let expectation =
            Expectation::with_threshold(ExpectationKind::ExpectMaxQueryExecutionTime, 40);
        assert_eq!(
            expectation.max_duration().unwrap(),
            Duration::from_millis(40)
        );
        let seconds = Expectation::max_query_execution_time(2, TimeUnit::Seconds);
        assert_eq!(seconds.max_duration().unwrap(), Duration::from_secs(2));
    }

    #[test]
    fn deserializes_from_config_shape() {
        let json = r#"{"kind":"expect_max_query_execution_time","value":5,"unit":"seconds"}"#;
        let expectation: Expectation = serde_json::from_str(json).unwrap();
        assert_eq!(
            expectation,
            Expectation::max_query_execution_time(5, TimeUnit::Seconds)
        );
        assert_eq!(
            expectation.to_string(),
            "expect_max_query_execution_time(5 seconds)"
        );
    }

    #[test]
    fn every_kind_has_a_rule() {
        let required = ExpectationKind::ALL
            .into_iter()
            .filter(|k| ValueRule::for_kind(*k) == ValueRule::Required)
            .count();
        assert_eq!(required, 15);
    }
}
