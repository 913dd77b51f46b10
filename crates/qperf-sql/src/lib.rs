//! # qperf-sql
//!
//! Performance expectations on the SQL a test sends to its database.
//!
//! A test declares expectations (at most N selects, no duplicate selects, no
//! connection leak, ...). A [`PerfSession`] resolves each declaration through
//! the [`ExpectationRegistry`], activates the recorders they need and hands
//! out a [`RecordingSink`] to the driver-interception layer (see `qperf-db`).
//! After the test, [`PerfSession::finalize_and_verify`] extracts a measure per
//! expectation, runs its verifier and collects the resulting issues.
//!
//! Modules, bottom-up:
//! - `analysis`: tokenizing and static inspection of statement text
//! - `recorder` and `sink`: passive capture of statement/connection events
//! - `leak`: open/close bookkeeping for connection-leak detection
//! - `extract` and `verify`: measure extraction and issue verification
//! - `registry` and `session`: wiring and per-test lifecycle

pub mod analysis;
pub mod error;
pub mod extract;
pub mod framework;
pub mod leak;
pub mod logging;
pub mod recorder;
pub mod registry;
pub mod render;
pub mod session;
pub mod sink;
pub mod suggestion;
pub mod verify;

mod test_support;

pub use error::{InstrumentationError, SqlPerfError};
pub use framework::{ConfiguredFrameworks, FrameworkCapabilities, NoFrameworks};
pub use leak::{ConnectionLeakTracker, LeakState};
pub use logging::init_tracing;
pub use recorder::{EventRecorder, Phase, Recorder, RecorderKind};
pub use registry::{ExpectationConfig, ExpectationRegistry};
pub use session::{FoundIssue, PerfSession, SessionBuilder, VerificationOutcome};
pub use sink::RecordingSink;
