//! Framework capability overrides.

use serde::{Deserialize, Serialize};

/// Which frameworks the code under test uses.
///
/// Only consulted to tailor suggestion text in issue explanations; it never
/// changes whether an issue is reported.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct FrameworksConfig {
    /// An ORM sits between the code under test and the driver.
    #[serde(default)]
    pub orm: bool,

    /// A web framework with ORM repository integration is in use.
    #[serde(default)]
    pub web: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_detect_nothing() {
        let config = FrameworksConfig::default();
        assert!(!config.orm);
        assert!(!config.web);
    }
}
