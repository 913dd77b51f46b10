//! Framework capabilities.
//!
//! Answers two questions used only to tailor suggestion text; the answers
//! never change whether an issue is reported.

use qperf_config::FrameworksConfig;

pub trait FrameworkCapabilities: Send + Sync {
    /// An ORM sits between the code under test and the driver.
    fn orm_present(&self) -> bool;

    /// A web framework with ORM repository integration is in use.
    fn web_framework_present(&self) -> bool;
}

/// Plain driver usage: no framework-specific hints.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFrameworks;

impl FrameworkCapabilities for NoFrameworks {
    fn orm_present(&self) -> bool {
        false
    }

    fn web_framework_present(&self) -> bool {
        false
    }
}

/// Capabilities declared in the `[frameworks]` configuration section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfiguredFrameworks {
    orm: bool,
    web: bool,
}

impl ConfiguredFrameworks {
    #[must_use]
    pub const fn new(orm: bool, web: bool) -> Self {
        Self { orm, web }
    }
}

impl From<&FrameworksConfig> for ConfiguredFrameworks {
    fn from(config: &FrameworksConfig) -> Self {
        Self::new(config.orm, config.web)
    }
}

impl FrameworkCapabilities for ConfiguredFrameworks {
    fn orm_present(&self) -> bool {
        self.orm
    }

    fn web_framework_present(&self) -> bool {
        self.web
    }
}
