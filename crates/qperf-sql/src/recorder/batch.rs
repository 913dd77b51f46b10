use chrono::{DateTime, Utc};
use qperf_core::{ConnectionId, StatementEvent, StatementKind};
use serde::Serialize;

use super::{EventRecorder, Phase};

/// Batching metadata of one write statement round-trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchEntry {
    pub connection: ConnectionId,
    pub kind: StatementKind,
    pub sql: String,
    /// Parameter sets sent together, `None` when sent on its own.
    pub batch_size: Option<u32>,
    pub at: DateTime<Utc>,
}

impl BatchEntry {
    /// Same rule as [`StatementEvent::is_batched`]: a batch of one is still
    /// one round-trip per row.
    #[must_use]
    pub const fn is_batched(&self) -> bool {
        matches!(self.batch_size, Some(n) if n > 1)
    }
}

/// Keeps how each insert, update and delete reached the database.
#[derive(Debug, Default)]
pub struct BatchRecorder {
    entries: Vec<BatchEntry>,
}

impl BatchRecorder {
    #[must_use]
    pub fn entries(&self) -> &[BatchEntry] {
        &self.entries
    }
}

impl EventRecorder for BatchRecorder {
    fn reset(&mut self) {
        self.entries.clear();
    }

    fn on_statement_executed(&mut self, event: &StatementEvent, _phase: Phase) {
        if matches!(
            event.kind,
            StatementKind::Insert | StatementKind::Update | StatementKind::Delete
        ) {
            self.entries.push(BatchEntry {
                connection: event.connection,
                kind: event.kind,
                sql: event.sql.clone(),
                batch_size: event.batch_size,
                at: event.started_at,
            });
        }
    }
}
