//! Event recorders.
//!
//! A recorder passively captures notifications for one session. Each variant
//! decides what it keeps: the persistence recorder keeps every statement, the
//! display recorders keep statements only to print them, the batch recorder
//! keeps batching metadata, and the connection recorders keep only
//! open/close notifications.

mod batch;
mod connection;
mod display;
mod persistence;

pub use batch::{BatchEntry, BatchRecorder};
pub use connection::{ConnectionLeakListener, ConnectionProfiler};
pub use display::DisplayRecorder;
pub use persistence::PersistenceRecorder;

use std::fmt;

use qperf_config::DisplayConfig;
use qperf_core::{ConnectionEvent, StatementEvent};
use serde::{Deserialize, Serialize};

use crate::error::InstrumentationError;

/// Where a session is in its test's lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Outside the test body: after activation and after `exit_body`.
    Setup,
    Body,
    /// After the body; no further events are accepted.
    Teardown,
}

/// Recorder variant an expectation needs. One instance per kind per session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecorderKind {
    Persistence,
    Display,
    DisplayBody,
    Batch,
    ConnectionProfiler,
    ConnectionLeak,
}

impl RecorderKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Persistence => "persistence",
            Self::Display => "display",
            Self::DisplayBody => "display_body",
            Self::Batch => "batch",
            Self::ConnectionProfiler => "connection_profiler",
            Self::ConnectionLeak => "connection_leak",
        }
    }
}

impl fmt::Display for RecorderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Common recorder contract.
pub trait EventRecorder {
    /// Return to the empty state.
    fn reset(&mut self);

    fn on_statement_executed(&mut self, event: &StatementEvent, phase: Phase);

    /// # Errors
    ///
    /// Connection-tracking recorders reject events after teardown.
    fn on_connection_event(
        &mut self,
        _event: &ConnectionEvent,
        _phase: Phase,
    ) -> Result<(), InstrumentationError> {
        Ok(())
    }

    /// Retained statements in execution order; empty for variants that keep a
    /// narrower view.
    fn collected_events(&self) -> &[StatementEvent] {
        &[]
    }

    /// Human-readable rendering for display-style recorders.
    fn report(&self, _display: &DisplayConfig) -> Option<String> {
        None
    }
}

#[derive(Debug)]
pub enum Recorder {
    Persistence(PersistenceRecorder),
    Display(DisplayRecorder),
    Batch(BatchRecorder),
    ConnectionProfiler(ConnectionProfiler),
    ConnectionLeak(ConnectionLeakListener),
}

impl Recorder {
    /// A fresh, empty recorder of the given kind.
    #[must_use]
    pub fn new(kind: RecorderKind) -> Self {
        match kind {
            RecorderKind::Persistence => Self::Persistence(PersistenceRecorder::default()),
            RecorderKind::Display => Self::Display(DisplayRecorder::whole_test()),
            RecorderKind::DisplayBody => Self::Display(DisplayRecorder::body_only()),
            RecorderKind::Batch => Self::Batch(BatchRecorder::default()),
            RecorderKind::ConnectionProfiler => {
                Self::ConnectionProfiler(ConnectionProfiler::default())
            }
            RecorderKind::ConnectionLeak => Self::ConnectionLeak(ConnectionLeakListener::default()),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> RecorderKind {
        match self {
            Self::Persistence(_) => RecorderKind::Persistence,
            Self::Display(d) if d.is_body_only() => RecorderKind::DisplayBody,
            Self::Display(_) => RecorderKind::Display,
            Self::Batch(_) => RecorderKind::Batch,
            Self::ConnectionProfiler(_) => RecorderKind::ConnectionProfiler,
            Self::ConnectionLeak(_) => RecorderKind::ConnectionLeak,
        }
    }

    /// Variant name, used in mismatch diagnostics.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.kind().as_str()
    }

    fn inner(&self) -> &dyn EventRecorder {
        match self {
            Self::Persistence(r) => r,
            Self::Display(r) => r,
            Self::Batch(r) => r,
            Self::ConnectionProfiler(r) => r,
            Self::ConnectionLeak(r) => r,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn EventRecorder {
        match self {
            Self::Persistence(r) => r,
            Self::Display(r) => r,
            Self::Batch(r) => r,
            Self::ConnectionProfiler(r) => r,
            Self::ConnectionLeak(r) => r,
        }
    }
}

impl EventRecorder for Recorder {
    fn reset(&mut self) {
        self.inner_mut().reset();
    }

    fn on_statement_executed(&mut self, event: &StatementEvent, phase: Phase) {
        self.inner_mut().on_statement_executed(event, phase);
    }

    fn on_connection_event(
        &mut self,
        event: &ConnectionEvent,
        phase: Phase,
    ) -> Result<(), InstrumentationError> {
        self.inner_mut().on_connection_event(event, phase)
    }

    fn collected_events(&self) -> &[StatementEvent] {
        self.inner().collected_events()
    }

    fn report(&self, display: &DisplayConfig) -> Option<String> {
        self.inner().report(display)
    }
}
