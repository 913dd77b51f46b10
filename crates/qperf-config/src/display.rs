//! Rendering options for issue messages and reports.

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Shortest truncation length that still shows the statement kind and table.
pub const MIN_SQL_LENGTH: usize = 16;

/// Default maximum SQL length in messages.
const fn default_max_sql_length() -> usize {
    2000
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
pub struct DisplayConfig {
    /// SQL text longer than this is truncated in messages; `0` disables truncation.
    #[serde(default = "default_max_sql_length")]
    pub max_sql_length: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            max_sql_length: default_max_sql_length(),
        }
    }
}

impl DisplayConfig {
    /// Check the truncation length.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` when `max_sql_length` is non-zero
    /// but shorter than [`MIN_SQL_LENGTH`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_sql_length != 0 && self.max_sql_length < MIN_SQL_LENGTH {
            return Err(ConfigError::InvalidValue {
                field: "display.max_sql_length".to_string(),
                reason: format!(
                    "{} is shorter than {MIN_SQL_LENGTH}; use 0 to disable truncation",
                    self.max_sql_length
                ),
            });
        }
        Ok(())
    }
}
