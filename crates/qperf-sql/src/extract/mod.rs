//! Measure extractors.
//!
//! Each extractor is a stateless unit value turning the persistence
//! recorder's events into one [`Measure`]. They never mutate their input and
//! are only run once the test body has finished.

mod columns;
mod count;
mod statements;
mod summary;
mod time;

pub use columns::{ColumnAggregate, ColumnTarget, ColumnsExtractor};
pub use count::CountExtractor;
pub use statements::{StatementFilter, StatementsExtractor};
pub use summary::SqlAnalysisExtractor;
pub use time::MaxExecutionTimeExtractor;

use qperf_core::{Measure, StatementEvent, StatementKind};

pub trait MeasureExtractor: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    fn extract(&self, events: &[StatementEvent]) -> Measure;
}

pub static EXECUTION_COUNT: CountExtractor = CountExtractor::new(None);
pub static SELECT_COUNT: CountExtractor = CountExtractor::new(Some(StatementKind::Select));
pub static INSERT_COUNT: CountExtractor = CountExtractor::new(Some(StatementKind::Insert));
pub static UPDATE_COUNT: CountExtractor = CountExtractor::new(Some(StatementKind::Update));
pub static DELETE_COUNT: CountExtractor = CountExtractor::new(Some(StatementKind::Delete));

pub static SELECTED_COLUMNS: ColumnsExtractor =
    ColumnsExtractor::new(ColumnTarget::Selected, ColumnAggregate::All);
pub static MAX_SELECTED_COLUMNS: ColumnsExtractor =
    ColumnsExtractor::new(ColumnTarget::Selected, ColumnAggregate::MaxPerStatement);
pub static UPDATED_COLUMNS: ColumnsExtractor =
    ColumnsExtractor::new(ColumnTarget::Updated, ColumnAggregate::All);
pub static MAX_UPDATED_COLUMNS: ColumnsExtractor =
    ColumnsExtractor::new(ColumnTarget::Updated, ColumnAggregate::MaxPerStatement);

pub static SELECT_STATEMENTS: StatementsExtractor =
    StatementsExtractor::new(StatementFilter::Selects);
pub static UNBOUND_STATEMENTS: StatementsExtractor =
    StatementsExtractor::new(StatementFilter::Unbound);
pub static LEADING_WILDCARD_SELECTS: StatementsExtractor =
    StatementsExtractor::new(StatementFilter::LeadingWildcardSelects);
pub static NON_PREPARED_STATEMENTS: StatementsExtractor =
    StatementsExtractor::new(StatementFilter::NonPrepared);

pub static MAX_EXECUTION_TIME: MaxExecutionTimeExtractor = MaxExecutionTimeExtractor;
pub static SQL_ANALYSIS: SqlAnalysisExtractor = SqlAnalysisExtractor;
