//! Expectations applied to every test session.

use qperf_core::Expectation;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Declarations merged into every session before the test's own ones.
///
/// A test cancels a global `disable_*` entry by declaring the matching
/// `enable_*` kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub expectations: Vec<Expectation>,
}

impl GlobalConfig {
    /// Validate every declaration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidExpectation` for the first malformed entry.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (index, expectation) in self.expectations.iter().enumerate() {
            expectation
                .validate()
                .map_err(|source| ConfigError::InvalidExpectation { index, source })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qperf_core::ExpectationKind;

    #[test]
    fn empty_by_default() {
        let config = GlobalConfig::default();
        assert!(config.expectations.is_empty());
        config.validate().unwrap();
    }

    #[test]
    fn reports_index_of_bad_entry() {
        let config = GlobalConfig {
            expectations: vec![
                Expectation::of(ExpectationKind::DisableSameSelects),
                Expectation::of(ExpectationKind::ExpectMaxSelect),
            ],
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidExpectation { index: 1, .. }
        ));
    }
}
