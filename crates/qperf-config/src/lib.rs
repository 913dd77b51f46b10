//! # qperf-config
//!
//! Layered configuration loading for qperf using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`QPERF_*` prefix, `__` as separator)
//! 2. Project-level `.qperf/config.toml`
//! 3. User-level `~/.config/qperf/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `QPERF_FRAMEWORKS__ORM` -> `frameworks.orm`,
//! `QPERF_DISPLAY__MAX_SQL_LENGTH` -> `display.max_sql_length`, etc.
//!
//! # Usage
//!
//! ```no_run
//! use qperf_config::QperfConfig;
//!
//! let config = QperfConfig::load_with_dotenv().expect("config");
//! for expectation in &config.global.expectations {
//!     println!("globally enabled: {expectation}");
//! }
//! ```

mod display;
mod error;
mod frameworks;
mod global;

pub use display::{DisplayConfig, MIN_SQL_LENGTH};
pub use error::ConfigError;
pub use frameworks::FrameworksConfig;
pub use global::GlobalConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct QperfConfig {
    #[serde(default)]
    pub global: GlobalConfig,
    #[serde(default)]
    pub frameworks: FrameworksConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

impl QperfConfig {
    /// Load configuration from all sources (TOML files + environment variables)
    /// and validate the global expectations.
    ///
    /// Does NOT call `dotenvy` -- use [`QperfConfig::load_with_dotenv`] for `.env` loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Figment` if a source cannot be read or does not
    /// match the schema, `ConfigError::InvalidExpectation` if a global
    /// declaration is malformed, and `ConfigError::InvalidValue` if a setting
    /// is out of range.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_figment(&Self::figment())
    }

    /// Load configuration with `.env` file support.
    ///
    /// # Errors
    ///
    /// Same as [`QperfConfig::load`].
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        Self::load_dotenv_from_workspace();
        Self::load()
    }

    /// Extract and validate from an arbitrary figment.
    ///
    /// # Errors
    ///
    /// Same as [`QperfConfig::load`].
    pub fn from_figment(figment: &Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Validate cross-field constraints.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidExpectation` for the first malformed
    /// global declaration and `ConfigError::InvalidValue` for an unusable
    /// display setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.global.validate()?;
        self.display.validate()
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can inspect the figment directly or add
    /// additional providers on top.
    #[must_use]
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Layer 1: User-global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        // Layer 2: Project-local config
        let local_path = PathBuf::from(".qperf/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        // Layer 3: Environment variables (highest priority)
        figment.merge(Env::prefixed("QPERF_").split("__"))
    }

    /// Path to the user-global config file.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("qperf").join("config.toml"))
    }

    /// Load `.env` from the workspace root.
    ///
    /// Walks up from `CARGO_MANIFEST_DIR` (if available) looking for a
    /// `.env` file, then falls back to the current directory.
    fn load_dotenv_from_workspace() {
        if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
            let mut dir = PathBuf::from(manifest_dir);
            // crate -> crates/ -> workspace root
            for _ in 0..3 {
                let env_path = dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                    return;
                }
                if !dir.pop() {
                    break;
                }
            }
        }

        let _ = dotenvy::dotenv();
    }
}
