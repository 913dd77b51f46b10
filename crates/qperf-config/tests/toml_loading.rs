//! Integration tests for TOML + env layering.
//!
//! Uses figment::Jail for sandboxed working directory and env var manipulation.

use figment::{
    Figment, Jail,
    providers::{Env, Format, Serialized, Toml},
};
use pretty_assertions::assert_eq;
use qperf_config::{ConfigError, QperfConfig};
use qperf_core::{Expectation, ExpectationKind, TimeUnit};

#[test]
fn loads_global_expectations_from_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[[global.expectations]]
kind = "disable_same_selects"

[[global.expectations]]
kind = "expect_max_query_execution_time"
value = 50
unit = "milliseconds"

[frameworks]
orm = true
"#,
        )?;

        let figment = Figment::from(Serialized::defaults(QperfConfig::default()))
            .merge(Toml::file("config.toml"));
        let config = QperfConfig::from_figment(&figment).map_err(|e| e.to_string())?;

        assert_eq!(
            config.global.expectations,
            vec![
                Expectation::of(ExpectationKind::DisableSameSelects),
                Expectation::max_query_execution_time(50, TimeUnit::Milliseconds),
            ]
        );
        assert!(config.frameworks.orm);
        assert!(!config.frameworks.web);
        assert_eq!(config.display.max_sql_length, 2000);
        Ok(())
    });
}

#[test]
fn project_file_is_picked_up_by_default_chain() {
    Jail::expect_with(|jail| {
        std::fs::create_dir(".qperf").map_err(|e| e.to_string())?;
        jail.create_file(
            ".qperf/config.toml",
            r#"
[display]
max_sql_length = 80
"#,
        )?;

        let config = QperfConfig::load().map_err(|e| e.to_string())?;
        assert_eq!(config.display.max_sql_length, 80);
        Ok(())
    });
}

#[test]
fn env_overrides_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[frameworks]
orm = false
web = false
"#,
        )?;
        jail.set_env("QPERF_FRAMEWORKS__ORM", "true");
        jail.set_env("QPERF_FRAMEWORKS__WEB", "true");

        let figment = Figment::from(Serialized::defaults(QperfConfig::default()))
            .merge(Toml::file("config.toml"))
            .merge(Env::prefixed("QPERF_").split("__"));
        let config = QperfConfig::from_figment(&figment).map_err(|e| e.to_string())?;

        assert!(config.frameworks.orm);
        assert!(config.frameworks.web);
        Ok(())
    });
}

#[test]
fn malformed_global_expectation_is_rejected() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[[global.expectations]]
kind = "expect_max_select"
"#,
        )?;

        let figment = Figment::from(Serialized::defaults(QperfConfig::default()))
            .merge(Toml::file("config.toml"));
        let err = QperfConfig::from_figment(&figment).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidExpectation { index: 0, .. }
        ));
        Ok(())
    });
}

#[test]
fn unknown_expectation_kind_is_a_figment_error() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[[global.expectations]]
kind = "expect_fast_code"
"#,
        )?;

        let figment = Figment::from(Serialized::defaults(QperfConfig::default()))
            .merge(Toml::file("config.toml"));
        let err = QperfConfig::from_figment(&figment).unwrap_err();
        assert!(matches!(err, ConfigError::Figment(_)));
        Ok(())
    });
}

#[test]
fn too_short_truncation_is_rejected() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[display]
max_sql_length = 4
"#,
        )?;

        let figment = Figment::from(Serialized::defaults(QperfConfig::default()))
            .merge(Toml::file("config.toml"));
        let err = QperfConfig::from_figment(&figment).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
        Ok(())
    });
}
