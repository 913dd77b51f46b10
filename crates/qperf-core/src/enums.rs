//! Statement kinds, expectation kinds and time units.
//!
//! All enums use `snake_case` serialization via `#[serde(rename_all = "snake_case")]`
//! and expose `as_str()` returning the same spelling, so configuration files,
//! JSON output and log fields agree on one name per variant.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::errors::CoreError;

// ---------------------------------------------------------------------------
// StatementKind
// ---------------------------------------------------------------------------

/// Coarse classification of an executed SQL statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
    Other,
}

impl StatementKind {
    pub const ALL: [Self; 5] = [
        Self::Select,
        Self::Insert,
        Self::Update,
        Self::Delete,
        Self::Other,
    ];

    /// Classify a statement by its leading keyword.
    ///
    /// Leading whitespace, `--` and `/* */` comments and opening parentheses
    /// are skipped. `WITH` is treated as a query; `REPLACE` as an insert.
    #[must_use]
    pub fn from_sql(sql: &str) -> Self {
        let keyword = leading_keyword(sql);
        if keyword.eq_ignore_ascii_case("select")
            || keyword.eq_ignore_ascii_case("with")
            || keyword.eq_ignore_ascii_case("values")
        {
            Self::Select
        } else if keyword.eq_ignore_ascii_case("insert") || keyword.eq_ignore_ascii_case("replace")
        {
            Self::Insert
        } else if keyword.eq_ignore_ascii_case("update") {
            Self::Update
        } else if keyword.eq_ignore_ascii_case("delete") {
            Self::Delete
        } else {
            Self::Other
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Select => "select",
            Self::Insert => "insert",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for StatementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// First keyword of a statement, skipping whitespace, comments and `(`.
fn leading_keyword(sql: &str) -> &str {
    let mut rest = sql;
    loop {
        rest = rest.trim_start_matches(|c: char| c.is_whitespace() || c == '(');
        if let Some(after) = rest.strip_prefix("--") {
            rest = after.split_once('\n').map_or("", |(_, tail)| tail);
        } else if let Some(after) = rest.strip_prefix("/*") {
            rest = after.split_once("*/").map_or("", |(_, tail)| tail);
        } else {
            break;
        }
    }
    let end = rest
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(rest.len());
    &rest[..end]
}

// ---------------------------------------------------------------------------
// TimeUnit
// ---------------------------------------------------------------------------

/// Unit attached to a time threshold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeUnit {
    Nanoseconds,
    Microseconds,
    #[default]
    Milliseconds,
    Seconds,
    Minutes,
}

impl TimeUnit {
    /// Convert an amount expressed in this unit to a `Duration`.
    #[must_use]
    pub const fn to_duration(self, amount: u64) -> Duration {
        match self {
            Self::Nanoseconds => Duration::from_nanos(amount),
            Self::Microseconds => Duration::from_micros(amount),
            Self::Milliseconds => Duration::from_millis(amount),
            Self::Seconds => Duration::from_secs(amount),
            Self::Minutes => Duration::from_secs(amount.saturating_mul(60)),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Nanoseconds => "nanoseconds",
            Self::Microseconds => "microseconds",
            Self::Milliseconds => "milliseconds",
            Self::Seconds => "seconds",
            Self::Minutes => "minutes",
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ExpectationKind
// ---------------------------------------------------------------------------

/// Every declarative expectation a test can attach.
///
/// `Enable*` variants are cancel kinds: declaring one deactivates the matching
/// `Disable*` kind for that test (see [`ExpectationKind::cancels`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpectationKind {
    ExpectJdbcQueryExecution,
    ExpectMaxJdbcQueryExecution,
    ExpectSelect,
    ExpectMaxSelect,
    ExpectInsert,
    ExpectMaxInsert,
    ExpectUpdate,
    ExpectMaxUpdate,
    ExpectDelete,
    ExpectMaxDelete,
    ExpectSelectedColumn,
    ExpectMaxSelectedColumn,
    ExpectUpdatedColumn,
    ExpectMaxUpdatedColumn,
    DisableSameSelects,
    EnableSameSelects,
    DisableSameSelectTypesWithDifferentParamValues,
    EnableSameSelectTypesWithDifferentParamValues,
    DisableLikeWithLeadingWildcard,
    EnableLikeWithLeadingWildcard,
    DisableQueriesWithoutBindParameters,
    EnableQueriesWithoutBindParameters,
    DisableStatements,
    EnableStatements,
    ExpectMaxQueryExecutionTime,
    ExpectJdbcBatching,
    ExpectNoConnectionLeak,
    DisplaySql,
    DisplaySqlOfTestMethodBody,
    ProfileConnection,
    AnalyzeSql,
}

impl ExpectationKind {
    pub const ALL: [Self; 31] = [
        Self::ExpectJdbcQueryExecution,
        Self::ExpectMaxJdbcQueryExecution,
        Self::ExpectSelect,
        Self::ExpectMaxSelect,
        Self::ExpectInsert,
        Self::ExpectMaxInsert,
        Self::ExpectUpdate,
        Self::ExpectMaxUpdate,
        Self::ExpectDelete,
        Self::ExpectMaxDelete,
        Self::ExpectSelectedColumn,
        Self::ExpectMaxSelectedColumn,
        Self::ExpectUpdatedColumn,
        Self::ExpectMaxUpdatedColumn,
        Self::DisableSameSelects,
        Self::EnableSameSelects,
        Self::DisableSameSelectTypesWithDifferentParamValues,
        Self::EnableSameSelectTypesWithDifferentParamValues,
        Self::DisableLikeWithLeadingWildcard,
        Self::EnableLikeWithLeadingWildcard,
        Self::DisableQueriesWithoutBindParameters,
        Self::EnableQueriesWithoutBindParameters,
        Self::DisableStatements,
        Self::EnableStatements,
        Self::ExpectMaxQueryExecutionTime,
        Self::ExpectJdbcBatching,
        Self::ExpectNoConnectionLeak,
        Self::DisplaySql,
        Self::DisplaySqlOfTestMethodBody,
        Self::ProfileConnection,
        Self::AnalyzeSql,
    ];

    /// The kind this cancel kind deactivates, if it is one.
    #[must_use]
    pub const fn cancels(self) -> Option<Self> {
        match self {
            Self::EnableSameSelects => Some(Self::DisableSameSelects),
            Self::EnableSameSelectTypesWithDifferentParamValues => {
                Some(Self::DisableSameSelectTypesWithDifferentParamValues)
            }
            Self::EnableLikeWithLeadingWildcard => Some(Self::DisableLikeWithLeadingWildcard),
            Self::EnableQueriesWithoutBindParameters => {
                Some(Self::DisableQueriesWithoutBindParameters)
            }
            Self::EnableStatements => Some(Self::DisableStatements),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ExpectJdbcQueryExecution => "expect_jdbc_query_execution",
            Self::ExpectMaxJdbcQueryExecution => "expect_max_jdbc_query_execution",
            Self::ExpectSelect => "expect_select",
            Self::ExpectMaxSelect => "expect_max_select",
            Self::ExpectInsert => "expect_insert",
            Self::ExpectMaxInsert => "expect_max_insert",
            Self::ExpectUpdate => "expect_update",
            Self::ExpectMaxUpdate => "expect_max_update",
            Self::ExpectDelete => "expect_delete",
            Self::ExpectMaxDelete => "expect_max_delete",
            Self::ExpectSelectedColumn => "expect_selected_column",
            Self::ExpectMaxSelectedColumn => "expect_max_selected_column",
            Self::ExpectUpdatedColumn => "expect_updated_column",
            Self::ExpectMaxUpdatedColumn => "expect_max_updated_column",
            Self::DisableSameSelects => "disable_same_selects",
            Self::EnableSameSelects => "enable_same_selects",
            Self::DisableSameSelectTypesWithDifferentParamValues => {
                "disable_same_select_types_with_different_param_values"
            }
            Self::EnableSameSelectTypesWithDifferentParamValues => {
                "enable_same_select_types_with_different_param_values"
            }
            Self::DisableLikeWithLeadingWildcard => "disable_like_with_leading_wildcard",
            Self::EnableLikeWithLeadingWildcard => "enable_like_with_leading_wildcard",
            Self::DisableQueriesWithoutBindParameters => "disable_queries_without_bind_parameters",
            Self::EnableQueriesWithoutBindParameters => "enable_queries_without_bind_parameters",
            Self::DisableStatements => "disable_statements",
            Self::EnableStatements => "enable_statements",
            Self::ExpectMaxQueryExecutionTime => "expect_max_query_execution_time",
            Self::ExpectJdbcBatching => "expect_jdbc_batching",
            Self::ExpectNoConnectionLeak => "expect_no_connection_leak",
            Self::DisplaySql => "display_sql",
            Self::DisplaySqlOfTestMethodBody => "display_sql_of_test_method_body",
            Self::ProfileConnection => "profile_connection",
            Self::AnalyzeSql => "analyze_sql",
        }
    }
}

impl fmt::Display for ExpectationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExpectationKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| CoreError::Validation(format!("unknown expectation kind '{s}'")))
    }
}
