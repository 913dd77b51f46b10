//! # qperf-core
//!
//! Core value types shared by every qperf crate.
//!
//! This crate carries no I/O and no global state:
//! - `Count`, the non-negative measured/expected quantity with pluralisation
//! - Statement and connection events emitted by a driver-interception layer
//! - The `Measure` union produced by extractors
//! - The `PerfIssue` value returned by verifiers
//! - Expectation kinds and validated expectation declarations
//! - Cross-cutting error types

pub mod count;
pub mod enums;
pub mod errors;
pub mod event;
pub mod expectation;
pub mod issue;
pub mod measure;

pub use count::Count;
pub use enums::{ExpectationKind, StatementKind, TimeUnit};
pub use errors::CoreError;
pub use event::{ConnectionEvent, ConnectionEventKind, ConnectionId, ParamValue, StatementEvent};
pub use expectation::Expectation;
pub use issue::PerfIssue;
pub use measure::Measure;
