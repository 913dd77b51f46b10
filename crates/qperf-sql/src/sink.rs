//! The notification entry point for driver-interception collaborators.
//!
//! A [`RecordingSink`] is a cheap, cloneable handle onto one session's
//! recorders. Collaborators may call it from any thread; calls are serialized
//! by a mutex. Once the session is torn down every notification is rejected.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use qperf_core::{ConnectionEvent, ConnectionId, StatementEvent};
use tracing::{error, trace};

use crate::error::InstrumentationError;
use crate::recorder::{EventRecorder, Phase, Recorder};

#[derive(Debug)]
struct SinkState {
    phase: Phase,
    recorders: Vec<Recorder>,
}

#[derive(Debug, Clone)]
pub struct RecordingSink {
    state: Arc<Mutex<SinkState>>,
    next_connection: Arc<AtomicU64>,
}

impl RecordingSink {
    pub(crate) fn new(recorders: Vec<Recorder>) -> Self {
        Self {
            state: Arc::new(Mutex::new(SinkState {
                phase: Phase::Setup,
                recorders,
            })),
            next_connection: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Record one executed statement in every active recorder.
    ///
    /// # Errors
    ///
    /// Returns `InstrumentationError::EventAfterTeardown` after teardown and
    /// `InstrumentationError::StatePoisoned` if a recorder panicked earlier.
    pub fn notify_statement_executed(
        &self,
        event: StatementEvent,
    ) -> Result<(), InstrumentationError> {
        let mut state = self.live_state("statement")?;
        let phase = state.phase;
        trace!(kind = %event.kind, connection = %event.connection, "statement executed");
        for recorder in &mut state.recorders {
            recorder.on_statement_executed(&event, phase);
        }
        Ok(())
    }

    /// # Errors
    ///
    /// Same as [`RecordingSink::notify_statement_executed`].
    pub fn notify_connection_opened(
        &self,
        connection: ConnectionId,
    ) -> Result<(), InstrumentationError> {
        self.connection_event(&ConnectionEvent::opened(connection))
    }

    /// # Errors
    ///
    /// Same as [`RecordingSink::notify_statement_executed`].
    pub fn notify_connection_closed(
        &self,
        connection: ConnectionId,
    ) -> Result<(), InstrumentationError> {
        self.connection_event(&ConnectionEvent::closed(connection))
    }

    /// A connection id unique within this session.
    #[must_use]
    pub fn next_connection_id(&self) -> ConnectionId {
        ConnectionId(self.next_connection.fetch_add(1, Ordering::Relaxed))
    }

    /// # Errors
    ///
    /// Returns `InstrumentationError::StatePoisoned` if the state is poisoned.
    pub fn phase(&self) -> Result<Phase, InstrumentationError> {
        Ok(self.lock()?.phase)
    }

    /// Move between setup and body.
    pub(crate) fn set_phase(&self, phase: Phase) -> Result<(), InstrumentationError> {
        let mut state = self.live_state("phase change")?;
        state.phase = phase;
        Ok(())
    }

    /// Enter teardown, stop the leak trackers and hand back the recorders.
    pub(crate) fn teardown(&self) -> Result<Vec<Recorder>, InstrumentationError> {
        let mut state = self.live_state("teardown")?;
        state.phase = Phase::Teardown;
        for recorder in &mut state.recorders {
            if let Recorder::ConnectionLeak(listener) = recorder {
                listener.tracker_mut().teardown();
            }
        }
        Ok(std::mem::take(&mut state.recorders))
    }

    fn connection_event(&self, event: &ConnectionEvent) -> Result<(), InstrumentationError> {
        let mut state = self.live_state("connection event")?;
        let phase = state.phase;
        trace!(connection = %event.connection, kind = %event.kind, "connection event");
        for recorder in &mut state.recorders {
            recorder.on_connection_event(event, phase)?;
        }
        Ok(())
    }

    fn live_state(
        &self,
        what: &'static str,
    ) -> Result<MutexGuard<'_, SinkState>, InstrumentationError> {
        let state = self.lock()?;
        if state.phase == Phase::Teardown {
            error!(
                what,
                "notification received after teardown; the interception layer is miswired"
            );
            return Err(InstrumentationError::EventAfterTeardown { what });
        }
        Ok(state)
    }

    fn lock(&self) -> Result<MutexGuard<'_, SinkState>, InstrumentationError> {
        self.state
            .lock()
            .map_err(|_| InstrumentationError::StatePoisoned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recorder::RecorderKind;
    use crate::test_support::helpers::event;
    use pretty_assertions::assert_eq;

    fn sink() -> RecordingSink {
        RecordingSink::new(vec![
            Recorder::new(RecorderKind::Persistence),
            Recorder::new(RecorderKind::ConnectionLeak),
        ])
    }

    #[test]
    fn statements_reach_every_recorder() {
        let sink = sink();
        sink.notify_statement_executed(event("SELECT 1")).unwrap();
        let recorders = sink.teardown().unwrap();
        assert_eq!(recorders[0].collected_events().len(), 1);
    }

    #[test]
    fn connection_ids_are_unique() {
        let sink = sink();
        let clone = sink.clone();
        assert_ne!(sink.next_connection_id(), clone.next_connection_id());
    }

    #[test]
    fn late_notifications_are_rejected() {
        let sink = sink();
        sink.teardown().unwrap();
        assert!(matches!(
            sink.notify_statement_executed(event("SELECT 1")),
            Err(InstrumentationError::EventAfterTeardown { what: "statement" })
        ));
        assert!(sink.notify_connection_opened(ConnectionId(1)).is_err());
        assert!(sink.teardown().is_err());
        assert_eq!(sink.phase().unwrap(), Phase::Teardown);
    }

    #[test]
    fn sink_is_usable_across_threads() {
        let sink = sink();
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let sink = sink.clone();
                std::thread::spawn(move || {
                    let id = sink.next_connection_id();
                    sink.notify_connection_opened(id).unwrap();
                    sink.notify_statement_executed(event("SELECT 1")).unwrap();
                    sink.notify_connection_closed(id).unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        let recorders = sink.teardown().unwrap();
        assert_eq!(recorders[0].collected_events().len(), 4);
        let Recorder::ConnectionLeak(listener) = &recorders[1] else {
            panic!("expected the leak listener");
        };
        assert_eq!(listener.tracker().balance(), 0);
    }
}
