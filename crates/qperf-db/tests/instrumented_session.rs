//! End-to-end tests: a real libSQL database behind an instrumented
//! connection, verified through a qperf session.

use pretty_assertions::assert_eq;
use qperf_core::{Expectation, ExpectationKind};
use qperf_db::{DatabaseError, InstrumentedConnection, InstrumentedDatabase};
use qperf_sql::{InstrumentationError, PerfSession};
use tempfile::TempDir;

async fn book_table(db: &InstrumentedDatabase) -> InstrumentedConnection {
    let conn = db.connect().unwrap();
    conn.execute(
        "CREATE TABLE book (id INTEGER PRIMARY KEY, title TEXT NOT NULL)",
        Vec::new(),
    )
    .await
    .unwrap();
    conn
}

#[tokio::test]
async fn n_plus_one_selects_are_reported() {
    let session = PerfSession::activate(&[Expectation::max_select(1)]).unwrap();
    let db = InstrumentedDatabase::open_local(":memory:", session.sink())
        .await
        .unwrap();
    let conn = book_table(&db).await;

    session.enter_body().unwrap();
    for id in 1_i64..=3 {
        let mut rows = conn
            .query("SELECT title FROM book WHERE id = ?", vec![id.into()])
            .await
            .unwrap();
        assert!(rows.next().await.unwrap().is_none());
    }
    session.exit_body().unwrap();
    conn.close().unwrap();

    let outcome = session.finalize_and_verify().unwrap();
    assert_eq!(outcome.issues.len(), 1);
    let text = outcome.issues[0].issue.to_string();
    assert!(text.contains("at most <1> select statement was"));
    assert!(text.contains("But in fact <3>"));
}

#[tokio::test]
async fn identical_selects_are_duplicates() {
    let session = PerfSession::activate(&[
        Expectation::of(ExpectationKind::DisableSameSelects),
        Expectation::of(ExpectationKind::DisableSameSelectTypesWithDifferentParamValues),
    ])
    .unwrap();
    let db = InstrumentedDatabase::open_local(":memory:", session.sink())
        .await
        .unwrap();
    let conn = book_table(&db).await;

    for _ in 0..2 {
        conn.query("SELECT title FROM book WHERE id = ?", vec![1_i64.into()])
            .await
            .unwrap();
    }
    conn.close().unwrap();

    let outcome = session.finalize_and_verify().unwrap();
    assert!(outcome.issue_for(ExpectationKind::DisableSameSelects).is_some());
    assert!(
        outcome
            .issue_for(ExpectationKind::DisableSameSelectTypesWithDifferentParamValues)
            .is_none()
    );
}

#[tokio::test]
async fn unclosed_connection_is_a_leak() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("leak.db");
    let session = PerfSession::activate(&[Expectation::of(ExpectationKind::ExpectNoConnectionLeak)])
        .unwrap();
    let db = InstrumentedDatabase::open_local(path.to_str().unwrap(), session.sink())
        .await
        .unwrap();

    session.enter_body().unwrap();
    let closed = db.connect().unwrap();
    let leaked = db.connect().unwrap();
    closed.close().unwrap();
    session.exit_body().unwrap();

    let outcome = session.finalize_and_verify().unwrap();
    let text = outcome.issues[0].issue.to_string();
    assert!(text.contains("1 connection(s) not closed"));
    assert!(text.contains(&leaked.id().to_string()));

    assert!(matches!(
        leaked.close(),
        Err(DatabaseError::Instrumentation(InstrumentationError::EventAfterTeardown { .. }))
    ));
}

#[tokio::test]
async fn balanced_connections_pass() {
    let session = PerfSession::activate(&[Expectation::of(ExpectationKind::ExpectNoConnectionLeak)])
        .unwrap();
    let db = InstrumentedDatabase::open_local(":memory:", session.sink())
        .await
        .unwrap();
    for _ in 0..3 {
        db.connect().unwrap().close().unwrap();
    }
    assert!(session.finalize_and_verify().unwrap().is_clean());
}

#[tokio::test]
async fn row_by_row_inserts_are_not_batched() {
    let session = PerfSession::activate(&[Expectation::jdbc_batching(None)]).unwrap();
    let db = InstrumentedDatabase::open_local(":memory:", session.sink())
        .await
        .unwrap();
    let conn = book_table(&db).await;

    session.enter_body().unwrap();
    for title in ["a", "b", "c"] {
        conn.execute("INSERT INTO book (title) VALUES (?)", vec![title.into()])
            .await
            .unwrap();
    }
    session.exit_body().unwrap();
    conn.close().unwrap();

    let outcome = session.finalize_and_verify().unwrap();
    assert!(outcome.issues[0].issue.to_string().contains("3 separate round-trips"));
}

#[tokio::test]
async fn batched_inserts_pass() {
    let session = PerfSession::activate(&[Expectation::jdbc_batching(Some(3))]).unwrap();
    let db = InstrumentedDatabase::open_local(":memory:", session.sink())
        .await
        .unwrap();
    let conn = book_table(&db).await;

    let affected = conn
        .execute_many(
            "INSERT INTO book (title) VALUES (?)",
            vec![vec!["a".into()], vec!["b".into()], vec!["c".into()]],
        )
        .await
        .unwrap();
    assert_eq!(affected, 3);

    let mut rows = conn
        .query("SELECT count(*) FROM book", Vec::new())
        .await
        .unwrap();
    let row = rows.next().await.unwrap().unwrap();
    assert_eq!(row.get::<i64>(0).unwrap(), 3);
    conn.close().unwrap();

    assert!(session.finalize_and_verify().unwrap().is_clean());
}

#[tokio::test]
async fn empty_batch_is_rejected() {
    let session = PerfSession::activate(&[]).unwrap();
    let db = InstrumentedDatabase::open_local(":memory:", session.sink())
        .await
        .unwrap();
    let conn = db.connect().unwrap();
    assert!(matches!(
        conn.execute_many("INSERT INTO book (title) VALUES (?)", Vec::new()).await,
        Err(DatabaseError::Query(_))
    ));
    conn.close().unwrap();
}

#[tokio::test]
async fn unprepared_statements_are_flagged() {
    let session = PerfSession::activate(&[Expectation::of(ExpectationKind::DisableStatements)])
        .unwrap();
    let db = InstrumentedDatabase::open_local(":memory:", session.sink())
        .await
        .unwrap();
    let conn = db.connect().unwrap();
    conn.execute_unprepared("CREATE TABLE t (x INTEGER)")
        .await
        .unwrap();
    conn.close().unwrap();

    let outcome = session.finalize_and_verify().unwrap();
    assert!(
        outcome.issues[0]
            .issue
            .to_string()
            .contains("instead of prepared statements (1)")
    );
}

#[tokio::test]
async fn failed_statements_are_still_recorded() {
    let session = PerfSession::activate(&[Expectation::with_threshold(
        ExpectationKind::ExpectMaxJdbcQueryExecution,
        0,
    )])
    .unwrap();
    let db = InstrumentedDatabase::open_local(":memory:", session.sink())
        .await
        .unwrap();
    let conn = db.connect().unwrap();
    assert!(matches!(
        conn.execute("INSERT INTO missing (x) VALUES (?)", vec![1_i64.into()]).await,
        Err(DatabaseError::LibSql(_))
    ));
    conn.close().unwrap();

    let outcome = session.finalize_and_verify().unwrap();
    assert_eq!(outcome.issues.len(), 1);
}

#[tokio::test]
async fn connection_profile_is_reported() {
    let session =
        PerfSession::activate(&[Expectation::of(ExpectationKind::ProfileConnection)]).unwrap();
    let db = InstrumentedDatabase::open_local(":memory:", session.sink())
        .await
        .unwrap();
    let conn = db.connect().unwrap();
    conn.query("SELECT 1", Vec::new()).await.unwrap();
    let id = conn.id();
    conn.close().unwrap();

    let outcome = session.finalize_and_verify().unwrap();
    assert!(outcome.is_clean());
    assert_eq!(outcome.reports.len(), 1);
    assert!(outcome.reports[0].contains(&id.to_string()));
}
