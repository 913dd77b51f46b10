//! Connection leak tracking.
//!
//! Counts acquisitions minus releases over a test's lifetime. The counter is
//! signed: a release without a matching acquisition drives it negative, which
//! is reported as unbalanced rather than clamped to zero.

use std::collections::BTreeMap;

use qperf_core::ConnectionId;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::InstrumentationError;

/// Whether every opened connection was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "balance", rename_all = "snake_case")]
pub enum LeakState {
    Balanced,
    /// Opens minus closes; positive means connections were left open.
    Unbalanced(i64),
}

#[derive(Debug, Default)]
pub struct ConnectionLeakTracker {
    opened: u64,
    closed: u64,
    /// Per-connection open count, to name the connections still held.
    held: BTreeMap<ConnectionId, i64>,
    torn_down: bool,
}

impl ConnectionLeakTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an acquisition.
    ///
    /// # Errors
    ///
    /// Returns `InstrumentationError::EventAfterTeardown` once torn down.
    pub fn opened(&mut self, connection: ConnectionId) -> Result<(), InstrumentationError> {
        self.ensure_live("connection open")?;
        self.opened += 1;
        *self.held.entry(connection).or_default() += 1;
        debug!(%connection, balance = self.balance(), "connection opened");
        Ok(())
    }

    /// Record a release.
    ///
    /// # Errors
    ///
    /// Returns `InstrumentationError::EventAfterTeardown` once torn down.
    pub fn closed(&mut self, connection: ConnectionId) -> Result<(), InstrumentationError> {
        self.ensure_live("connection close")?;
        self.closed += 1;
        let held = self.held.entry(connection).or_default();
        *held -= 1;
        if *held < 0 {
            warn!(%connection, "connection closed without a matching open");
        }
        if *held == 0 {
            self.held.remove(&connection);
        }
        debug!(%connection, balance = self.balance(), "connection closed");
        Ok(())
    }

    /// Stop accepting events and return the final state.
    pub fn teardown(&mut self) -> LeakState {
        self.torn_down = true;
        self.state()
    }

    #[must_use]
    pub fn balance(&self) -> i64 {
        i64::try_from(self.opened).unwrap_or(i64::MAX)
            - i64::try_from(self.closed).unwrap_or(i64::MAX)
    }

    #[must_use]
    pub fn state(&self) -> LeakState {
        match self.balance() {
            0 => LeakState::Balanced,
            n => LeakState::Unbalanced(n),
        }
    }

    #[must_use]
    pub const fn opened_count(&self) -> u64 {
        self.opened
    }

    #[must_use]
    pub const fn closed_count(&self) -> u64 {
        self.closed
    }

    /// Connections opened more often than closed, in id order.
    #[must_use]
    pub fn still_open(&self) -> Vec<ConnectionId> {
        self.held
            .iter()
            .filter(|(_, held)| **held > 0)
            .map(|(connection, _)| *connection)
            .collect()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    const fn ensure_live(&self, what: &'static str) -> Result<(), InstrumentationError> {
        if self.torn_down {
            Err(InstrumentationError::EventAfterTeardown { what })
        } else {
            Ok(())
        }
    }
}
