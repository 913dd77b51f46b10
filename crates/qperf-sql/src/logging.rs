//! Subscriber setup for test binaries.
//!
//! Reports and issue summaries go through `tracing`; nothing is printed
//! unless a subscriber is installed. Call [`init_tracing`] from a test
//! harness or a `ctor`-style setup hook. Repeated calls are no-ops.

use std::sync::OnceLock;

use tracing_subscriber::EnvFilter;

/// Environment variable overriding the default filter, e.g. `QPERF_LOG=qperf_sql=debug`.
pub const LOG_ENV: &str = "QPERF_LOG";

/// Install a test-friendly fmt subscriber once per process.
///
/// # Errors
///
/// Returns an error if another global subscriber was installed first.
pub fn init_tracing(default_level: &str) -> anyhow::Result<()> {
    static INSTALLED: OnceLock<()> = OnceLock::new();
    if INSTALLED.get().is_some() {
        return Ok(());
    }

    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    let _ = INSTALLED.set(());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_call_is_a_no_op() {
        // Another test binary may own the global subscriber; only the
        // repeated call through this guard must succeed.
        if init_tracing("warn").is_ok() {
            assert!(init_tracing("debug").is_ok());
        }
    }
}
