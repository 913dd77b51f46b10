//! `Count`: the non-negative quantity compared by threshold verifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A non-negative count of statements, columns or round-trips.
///
/// Renders as the bare number. [`Count::noun`] and [`Count::verb`] give the
/// agreeing forms for messages ("1 statement was", "0 statements were").
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Count(u64);

impl Count {
    pub const ZERO: Self = Self(0);

    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub const fn is_greater_than(self, other: Self) -> bool {
        self.0 > other.0
    }

    /// `singular` for a count of exactly one, `singular + "s"` otherwise.
    #[must_use]
    pub fn noun(self, singular: &str) -> String {
        if self.0 == 1 {
            singular.to_string()
        } else {
            format!("{singular}s")
        }
    }

    /// "was" for a count of exactly one, "were" otherwise.
    #[must_use]
    pub const fn verb(self) -> &'static str {
        if self.0 == 1 { "was" } else { "were" }
    }
}

impl From<u64> for Count {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<usize> for Count {
    fn from(value: usize) -> Self {
        Self(u64::try_from(value).unwrap_or(u64::MAX))
    }
}

impl fmt::Display for Count {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
