//! # qperf-db
//!
//! Driver interception for libSQL.
//!
//! Wraps `libsql` databases and connections so that every statement they run
//! and every connection they open or close is reported to a
//! [`qperf_sql::RecordingSink`]. Tests run their data access through an
//! [`InstrumentedConnection`] and then verify the session as usual.

pub mod connection;
pub mod error;
pub mod params;

pub use connection::{InstrumentedConnection, InstrumentedDatabase};
pub use error::DatabaseError;
