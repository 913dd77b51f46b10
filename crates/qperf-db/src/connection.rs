//! Instrumented libSQL database and connection handles.

use chrono::Utc;
use libsql::Builder;
use qperf_core::{ConnectionId, StatementEvent};
use qperf_sql::RecordingSink;
use tracing::{debug, warn};

use crate::error::DatabaseError;
use crate::params::to_param_values;

/// A libSQL database whose connections report to one session's sink.
pub struct InstrumentedDatabase {
    db: libsql::Database,
    sink: RecordingSink,
}

impl InstrumentedDatabase {
    /// Open a local database (`:memory:` or a file path).
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::LibSql` if the database cannot be opened.
    pub async fn open_local(path: &str, sink: RecordingSink) -> Result<Self, DatabaseError> {
        let db = Builder::new_local(path).build().await?;
        Ok(Self { db, sink })
    }

    /// Wrap an already-built database.
    #[must_use]
    pub const fn from_database(db: libsql::Database, sink: RecordingSink) -> Self {
        Self { db, sink }
    }

    /// Open a connection and report it as opened.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::LibSql` if libSQL refuses the connection and
    /// `DatabaseError::Instrumentation` if the session was already torn down.
    pub fn connect(&self) -> Result<InstrumentedConnection, DatabaseError> {
        let conn = self.db.connect()?;
        let id = self.sink.next_connection_id();
        self.sink.notify_connection_opened(id)?;
        debug!(connection = %id, "connection opened");
        Ok(InstrumentedConnection {
            conn,
            id,
            sink: self.sink.clone(),
            closed: false,
        })
    }
}

/// A connection that reports every statement it runs.
///
/// Call [`InstrumentedConnection::close`] to return it; dropping it without
/// closing leaves it open as far as leak detection is concerned.
pub struct InstrumentedConnection {
    conn: libsql::Connection,
    id: ConnectionId,
    sink: RecordingSink,
    closed: bool,
}

impl InstrumentedConnection {
    #[must_use]
    pub const fn id(&self) -> ConnectionId {
        self.id
    }

    /// Access the underlying libSQL connection. Statements run through it
    /// directly are not recorded.
    #[must_use]
    pub const fn raw(&self) -> &libsql::Connection {
        &self.conn
    }

    /// Execute a prepared statement with bound values.
    ///
    /// The statement is recorded even when it fails.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::LibSql` if the statement fails and
    /// `DatabaseError::Instrumentation` if the session rejects the event.
    pub async fn execute(
        &self,
        sql: &str,
        params: Vec<libsql::Value>,
    ) -> Result<u64, DatabaseError> {
        let recorded = to_param_values(&params);
        let started_at = Utc::now();
        let result = self.conn.execute(sql, params).await;
        self.record(StatementEvent::new(self.id, sql, recorded, started_at, Utc::now()))?;
        Ok(result?)
    }

    /// Run a prepared query with bound values.
    ///
    /// Only the call itself is timed, not row iteration.
    ///
    /// # Errors
    ///
    /// Same as [`InstrumentedConnection::execute`].
    pub async fn query(
        &self,
        sql: &str,
        params: Vec<libsql::Value>,
    ) -> Result<libsql::Rows, DatabaseError> {
        let recorded = to_param_values(&params);
        let started_at = Utc::now();
        let result = self.conn.query(sql, params).await;
        self.record(StatementEvent::new(self.id, sql, recorded, started_at, Utc::now()))?;
        Ok(result?)
    }

    /// Execute SQL text without preparing it (no bound values).
    ///
    /// # Errors
    ///
    /// Same as [`InstrumentedConnection::execute`].
    pub async fn execute_unprepared(&self, sql: &str) -> Result<(), DatabaseError> {
        let started_at = Utc::now();
        let result = self.conn.execute_batch(sql).await;
        let event = StatementEvent::new(self.id, sql, Vec::new(), started_at, Utc::now())
            .with_prepared(false);
        self.record(event)?;
        result?;
        Ok(())
    }

    /// Execute one write statement for each row of values inside a single
    /// transaction, recorded as one batch of `rows.len()`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Query` for an empty batch, plus the errors of
    /// [`InstrumentedConnection::execute`]. A failing row rolls the batch back.
    pub async fn execute_many(
        &self,
        sql: &str,
        rows: Vec<Vec<libsql::Value>>,
    ) -> Result<u64, DatabaseError> {
        let Some(first) = rows.first() else {
            return Err(DatabaseError::Query(format!("empty batch for: {sql}")));
        };
        let batch_size = u32::try_from(rows.len()).map_err(|_| {
            DatabaseError::Query(format!("batch of {} rows is too large", rows.len()))
        })?;
        let recorded = to_param_values(first);

        let started_at = Utc::now();
        let result = self.run_batch(sql, rows).await;
        let event = StatementEvent::new(self.id, sql, recorded, started_at, Utc::now())
            .with_batch_size(batch_size);
        self.record(event)?;
        result
    }

    /// Report the connection as closed.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Instrumentation` if the session was already
    /// torn down.
    pub fn close(mut self) -> Result<(), DatabaseError> {
        self.closed = true;
        self.sink.notify_connection_closed(self.id)?;
        debug!(connection = %self.id, "connection closed");
        Ok(())
    }

    async fn run_batch(
        &self,
        sql: &str,
        rows: Vec<Vec<libsql::Value>>,
    ) -> Result<u64, DatabaseError> {
        let tx = self.conn.transaction().await?;
        let mut affected = 0;
        for row in rows {
            affected += tx.execute(sql, row).await?;
        }
        tx.commit().await?;
        Ok(affected)
    }

    fn record(&self, event: StatementEvent) -> Result<(), DatabaseError> {
        Ok(self.sink.notify_statement_executed(event)?)
    }
}

impl Drop for InstrumentedConnection {
    fn drop(&mut self) {
        if !self.closed {
            warn!(connection = %self.id, "connection dropped without close");
        }
    }
}
