use qperf_core::StatementEvent;
use tracing::trace;

use super::{EventRecorder, Phase};

/// Keeps every statement verbatim, in execution order.
#[derive(Debug, Default)]
pub struct PersistenceRecorder {
    events: Vec<StatementEvent>,
}

impl EventRecorder for PersistenceRecorder {
    fn reset(&mut self) {
        self.events.clear();
    }

    fn on_statement_executed(&mut self, event: &StatementEvent, phase: Phase) {
        trace!(kind = %event.kind, ?phase, sql = %event.sql, "statement recorded");
        self.events.push(event.clone());
    }

    fn collected_events(&self) -> &[StatementEvent] {
        &self.events
    }
}
