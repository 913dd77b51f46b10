//! `PerfIssue`: the value a verifier returns.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome of one verification: either [`PerfIssue::NONE`] or an issue
/// carrying a human-readable explanation.
///
/// Verifiers return this value; a discovered issue is never signalled through
/// an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PerfIssue {
    description: Option<String>,
}

impl PerfIssue {
    pub const NONE: Self = Self { description: None };

    #[must_use]
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
        }
    }

    #[must_use]
    pub const fn is_none(&self) -> bool {
        self.description.is_none()
    }

    #[must_use]
    pub const fn is_issue(&self) -> bool {
        self.description.is_some()
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

impl fmt::Display for PerfIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.description {
            Some(description) => f.write_str(description),
            None => f.write_str("no performance issue"),
        }
    }
}
