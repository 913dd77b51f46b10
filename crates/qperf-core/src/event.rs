//! Events emitted by a driver-interception layer.
//!
//! A [`StatementEvent`] is created once per executed statement (or per
//! physical batch) and never mutated afterwards. [`ConnectionEvent`]s carry
//! only connection open/close notifications.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::enums::StatementKind;

/// Identifier of a monitored connection, unique within one test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(pub u64);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// A bound parameter value as seen by the driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ParamValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl ParamValue {
    /// Text content, if this is a text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Renders the value as a SQL literal (`NULL`, `42`, `'it''s'`, `X'0AFF'`).
impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Real(r) => write!(f, "{r}"),
            Self::Text(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Self::Blob(bytes) => {
                f.write_str("X'")?;
                for byte in bytes {
                    write!(f, "{byte:02X}")?;
                }
                f.write_str("'")
            }
        }
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self::Real(value)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl<T: Into<Self>> From<Option<T>> for ParamValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

/// One executed SQL statement (or one physical batch of it).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementEvent {
    pub connection: ConnectionId,
    pub sql: String,
    /// Bound parameter values in placeholder order; empty when none were bound.
    pub params: Vec<ParamValue>,
    pub kind: StatementKind,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// `false` when the statement text was sent without a prepare step.
    pub prepared: bool,
    /// Number of parameter sets sent in one round-trip, `None` when the
    /// statement was sent on its own.
    pub batch_size: Option<u32>,
}

impl StatementEvent {
    /// Build a prepared, non-batched event; the kind is derived from the SQL.
    #[must_use]
    pub fn new(
        connection: ConnectionId,
        sql: impl Into<String>,
        params: Vec<ParamValue>,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
    ) -> Self {
        let sql = sql.into();
        Self {
            connection,
            kind: StatementKind::from_sql(&sql),
            sql,
            params,
            started_at,
            finished_at,
            prepared: true,
            batch_size: None,
        }
    }

    #[must_use]
    pub const fn with_prepared(mut self, prepared: bool) -> Self {
        self.prepared = prepared;
        self
    }

    #[must_use]
    pub const fn with_batch_size(mut self, batch_size: u32) -> Self {
        self.batch_size = Some(batch_size);
        self
    }

    /// Wall-clock execution time; zero if the clock went backwards.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        (self.finished_at - self.started_at)
            .to_std()
            .unwrap_or_default()
    }

    /// Whether the statement was part of a multi-row physical batch.
    #[must_use]
    pub const fn is_batched(&self) -> bool {
        matches!(self.batch_size, Some(n) if n > 1)
    }
}

/// What happened to a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionEventKind {
    Opened,
    Closed,
}

impl ConnectionEventKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Opened => "opened",
            Self::Closed => "closed",
        }
    }
}

impl fmt::Display for ConnectionEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A connection open/close notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionEvent {
    pub connection: ConnectionId,
    pub kind: ConnectionEventKind,
    pub at: DateTime<Utc>,
}

impl ConnectionEvent {
    #[must_use]
    pub fn opened(connection: ConnectionId) -> Self {
        Self {
            connection,
            kind: ConnectionEventKind::Opened,
            at: Utc::now(),
        }
    }

    #[must_use]
    pub fn closed(connection: ConnectionId) -> Self {
        Self {
            connection,
            kind: ConnectionEventKind::Closed,
            at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;
    use pretty_assertions::assert_eq;

    #[test]
    fn new_event_classifies_and_defaults() {
        let t0 = Utc::now();
        let event = StatementEvent::new(
            ConnectionId(1),
            "UPDATE book SET title = ? WHERE id = ?",
            vec!["Dune".into(), 1i64.into()],
            t0,
            t0 + TimeDelta::milliseconds(12),
        );
        assert_eq!(event.kind, StatementKind::Update);
        assert!(event.prepared);
        assert_eq!(event.batch_size, None);
        assert_eq!(event.elapsed(), Duration::from_millis(12));
    }

    #[test]
    fn elapsed_never_negative() {
        let t0 = Utc::now();
        let earlier = t0 - TimeDelta::seconds(1);
        let event = StatementEvent::new(ConnectionId(1), "SELECT 1", vec![], t0, earlier);
        assert_eq!(event.elapsed(), Duration::ZERO);
    }

    #[test]
    fn batch_flag() {
        let t0 = Utc::now();
        let sql = "INSERT INTO t VALUES (?)";
        let single = StatementEvent::new(ConnectionId(1), sql, vec![], t0, t0);
        assert!(!single.is_batched());
        assert!(!single.clone().with_batch_size(1).is_batched());
        assert!(single.with_batch_size(3).is_batched());
    }

    #[test]
    fn param_values_render_as_sql_literals() {
        let rendered: Vec<String> = [
            ParamValue::Null,
            ParamValue::Integer(42),
            ParamValue::Text("it's".into()),
            ParamValue::Blob(vec![0x0a, 0xff]),
            ParamValue::from(None::<i64>),
        ]
        .iter()
        .map(ToString::to_string)
        .collect();
        assert_eq!(rendered, vec!["NULL", "42", "'it''s'", "X'0AFF'", "NULL"]);
    }

    #[test]
    fn connection_id_display() {
        assert_eq!(ConnectionId(7).to_string(), "conn-7");
    }
}
