use std::fmt::Write as _;

use qperf_config::DisplayConfig;
use qperf_core::StatementEvent;

use super::{EventRecorder, Phase};
use crate::render::render_statement;

/// Keeps statements only to print them once the test is over.
#[derive(Debug)]
pub struct DisplayRecorder {
    body_only: bool,
    events: Vec<StatementEvent>,
}

impl DisplayRecorder {
    #[must_use]
    pub const fn whole_test() -> Self {
        Self {
            body_only: false,
            events: Vec::new(),
        }
    }

    /// Ignores statements executed outside the test body.
    #[must_use]
    pub const fn body_only() -> Self {
        Self {
            body_only: true,
            events: Vec::new(),
        }
    }

    #[must_use]
    pub const fn is_body_only(&self) -> bool {
        self.body_only
    }
}

impl EventRecorder for DisplayRecorder {
    fn reset(&mut self) {
        self.events.clear();
    }

    fn on_statement_executed(&mut self, event: &StatementEvent, phase: Phase) {
        if !self.body_only || phase == Phase::Body {
            self.events.push(event.clone());
        }
    }

    fn collected_events(&self) -> &[StatementEvent] {
        &self.events
    }

    fn report(&self, display: &DisplayConfig) -> Option<String> {
        let scope = if self.body_only { "test method body" } else { "test" };
        let mut report = format!("[qperf] SQL executed by the {scope} ({}):\n", self.events.len());
        for (n, event) in self.events.iter().enumerate() {
            let _ = writeln!(
                report,
                "  {:>3}. {} ({:?})",
                n + 1,
                render_statement(event, display),
                event.elapsed()
            );
        }
        Some(report)
    }
}
