//! Shared test utilities for qperf-sql unit tests.
