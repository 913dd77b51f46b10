use std::collections::BTreeMap;
use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use qperf_config::DisplayConfig;
use qperf_core::{ConnectionEvent, ConnectionEventKind, ConnectionId, StatementEvent};

use super::{EventRecorder, Phase};
use crate::error::InstrumentationError;
use crate::leak::ConnectionLeakTracker;

/// Keeps the connection open/close timeline for a profile report.
#[derive(Debug, Default)]
pub struct ConnectionProfiler {
    events: Vec<ConnectionEvent>,
    statements: BTreeMap<ConnectionId, usize>,
}

impl ConnectionProfiler {
    #[must_use]
    pub fn events(&self) -> &[ConnectionEvent] {
        &self.events
    }
}

impl EventRecorder for ConnectionProfiler {
    fn reset(&mut self) {
        self.events.clear();
        self.statements.clear();
    }

    fn on_statement_executed(&mut self, event: &StatementEvent, _phase: Phase) {
        *self.statements.entry(event.connection).or_default() += 1;
    }

    fn on_connection_event(
        &mut self,
        event: &ConnectionEvent,
        phase: Phase,
    ) -> Result<(), InstrumentationError> {
        if phase == Phase::Teardown {
            return Err(InstrumentationError::EventAfterTeardown {
                what: "connection event",
            });
        }
        self.events.push(event.clone());
        Ok(())
    }

    fn report(&self, _display: &DisplayConfig) -> Option<String> {
        let start = self.events.first().map_or_else(Utc::now, |e| e.at);
        let mut opened_at: BTreeMap<ConnectionId, DateTime<Utc>> = BTreeMap::new();
        let mut report = format!("[qperf] Connection profile ({} events):\n", self.events.len());
        for event in &self.events {
            let offset = (event.at - start).num_milliseconds();
            let _ = write!(report, "  +{offset}ms {} {}", event.connection, event.kind);
            match event.kind {
                ConnectionEventKind::Opened => {
                    opened_at.insert(event.connection, event.at);
                }
                ConnectionEventKind::Closed => {
                    if let Some(opened) = opened_at.remove(&event.connection) {
                        let held = (event.at - opened).num_milliseconds();
                        let statements = self
                            .statements
                            .get(&event.connection)
                            .copied()
                            .unwrap_or(0);
                        let _ = write!(report, " (held {held}ms, {statements} statements)");
                    }
                }
            }
            report.push('\n');
        }
        for connection in opened_at.keys() {
            let _ = writeln!(report, "  {connection} never closed");
        }
        Some(report)
    }
}

/// Feeds open/close notifications into a [`ConnectionLeakTracker`].
#[derive(Debug, Default)]
pub struct ConnectionLeakListener {
    tracker: ConnectionLeakTracker,
}

impl ConnectionLeakListener {
    #[must_use]
    pub const fn tracker(&self) -> &ConnectionLeakTracker {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut ConnectionLeakTracker {
        &mut self.tracker
    }
}

impl EventRecorder for ConnectionLeakListener {
    fn reset(&mut self) {
        self.tracker.reset();
    }

    fn on_statement_executed(&mut self, _event: &StatementEvent, _phase: Phase) {}

    fn on_connection_event(
        &mut self,
        event: &ConnectionEvent,
        _phase: Phase,
    ) -> Result<(), InstrumentationError> {
        match event.kind {
            ConnectionEventKind::Opened => self.tracker.opened(event.connection),
            ConnectionEventKind::Closed => self.tracker.closed(event.connection),
        }
    }
}
