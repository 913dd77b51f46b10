//! Configuration error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// Figment extraction or merge error.
    #[error("Configuration error: {0}")]
    Figment(#[from] figment::Error),

    /// A configuration field has an invalid value.
    #[error("Invalid configuration value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },

    /// A globally declared expectation failed validation.
    #[error("Invalid global expectation #{index}: {source}")]
    InvalidExpectation {
        index: usize,
        #[source]
        source: qperf_core::CoreError,
    },
}
