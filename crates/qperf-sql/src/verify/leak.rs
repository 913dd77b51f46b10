use std::fmt::Write as _;

use qperf_core::PerfIssue;

use super::{PerfIssueVerifier, VerifierInput, VerifyContext, mismatch};
use crate::error::SqlPerfError;
use crate::leak::LeakState;
use crate::recorder::Recorder;
use crate::suggestion::Suggestion;

/// Reads the leak tracker: anything but a zero balance is a leak.
#[derive(Debug, Clone, Copy)]
pub struct ConnectionLeakVerifier;

impl PerfIssueVerifier for ConnectionLeakVerifier {
    fn verify(
        &self,
        ctx: &VerifyContext<'_>,
        input: VerifierInput<'_>,
    ) -> Result<PerfIssue, SqlPerfError> {
        let VerifierInput::Recorder(Recorder::ConnectionLeak(listener)) = input else {
            return Err(mismatch(ctx, "connection_leak", input));
        };
        let tracker = listener.tracker();
        let LeakState::Unbalanced(balance) = tracker.state() else {
            return Ok(PerfIssue::NONE);
        };

        let mut description = String::new();
        if balance > 0 {
            let _ = writeln!(
                description,
                "Database connection leak: {balance} connection(s) not closed \
                 (opened {}, closed {})",
                tracker.opened_count(),
                tracker.closed_count()
            );
            let still_open: Vec<String> = tracker
                .still_open()
                .iter()
                .map(ToString::to_string)
                .collect();
            if !still_open.is_empty() {
                let _ = writeln!(description, "\tStill open: {}", still_open.join(", "));
            }
            Suggestion::ConnectionLeak.append_to(&mut description, ctx.frameworks);
        } else {
            let _ = writeln!(
                description,
                "Unbalanced connection tracking: {} more close(s) than open(s) \
                 (opened {}, closed {})",
                balance.unsigned_abs(),
                tracker.opened_count(),
                tracker.closed_count()
            );
        }
        Ok(PerfIssue::new(description))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::framework::{ConfiguredFrameworks, FrameworkCapabilities, NoFrameworks};
    use crate::recorder::{EventRecorder, Phase, RecorderKind};
    use qperf_config::DisplayConfig;
    use qperf_core::{ConnectionEvent, ConnectionId, Expectation, ExpectationKind, Measure};

    fn leak_check(opens: u64, closes: u64) -> PerfIssue {
        leak_check_with(opens, closes, &NoFrameworks)
    }

    fn leak_check_with(
        opens: u64,
        closes: u64,
        frameworks: &dyn FrameworkCapabilities,
    ) -> PerfIssue {
        let mut recorder = Recorder::new(RecorderKind::ConnectionLeak);
        for n in 0..opens {
            recorder
                .on_connection_event(&ConnectionEvent::opened(ConnectionId(n)), Phase::Body)
                .unwrap();
        }
        for n in 0..closes {
            recorder
                .on_connection_event(&ConnectionEvent::closed(ConnectionId(n)), Phase::Body)
                .unwrap();
        }
        let display = DisplayConfig::default();
        let expectation = Expectation::of(ExpectationKind::ExpectNoConnectionLeak);
        let ctx = VerifyContext {
            expectation: &expectation,
            frameworks,
            display: &display,
        };
        ConnectionLeakVerifier
            .verify(&ctx, VerifierInput::Recorder(&recorder))
            .unwrap()
    }

    #[test]
    fn balanced_is_clean() {
        for k in 0..4 {
            assert!(leak_check(k, k).is_none());
        }
    }

    #[test]
    fn missing_close_is_a_leak() {
        for k in 1..4 {
            let issue = leak_check(k, k - 1);
            let text = issue.description().unwrap();
            assert!(text.contains("1 connection(s) not closed"));
            assert!(text.contains(&format!("Still open: conn-{}", k - 1)));
        }
    }

    #[test]
    fn extra_close_is_reported() {
        let issue = leak_check(0, 1);
        let text = issue.description().unwrap();
        assert!(text.contains("1 more close(s) than open(s)"));
        assert!(!text.contains("Close every connection"));
    }

    #[test]
    fn leak_hints_follow_frameworks() {
        let plain = leak_check(2, 1);
        assert!(
            plain
                .description()
                .unwrap()
                .contains("\tClose every connection you acquire")
        );
        assert!(!plain.description().unwrap().contains("With an ORM"));

        let orm = leak_check_with(2, 1, &ConfiguredFrameworks::new(true, false));
        let text = orm.description().unwrap();
        assert!(text.contains("With an ORM, let it scope sessions"));
        assert!(!text.contains("With a web framework"));

        let both = leak_check_with(2, 1, &ConfiguredFrameworks::new(true, true));
        assert!(both.description().unwrap().contains("With a web framework"));
    }

    #[test]
    fn measure_input_is_rejected() {
        let display = DisplayConfig::default();
        let expectation = Expectation::of(ExpectationKind::ExpectNoConnectionLeak);
        let ctx = VerifyContext {
            expectation: &expectation,
            frameworks: &NoFrameworks,
            display: &display,
        };
        let measure = Measure::Columns(Vec::new());
        assert!(
            ConnectionLeakVerifier
                .verify(&ctx, VerifierInput::Measure(&measure))
                .is_err()
        );
    }
}
