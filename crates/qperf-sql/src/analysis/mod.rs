//! Static analysis of recorded statement text.
//!
//! Statements are parsed with `sqlparser`, SQLite dialect first and the
//! generic dialect as fallback. Text neither dialect accepts degrades to
//! fewer findings, never to an error.

pub mod columns;
pub mod groups;
pub mod like;
pub mod literals;
pub mod shape;

pub use like::LikePattern;

use qperf_core::{StatementEvent, StatementKind};
use sqlparser::ast::Statement;
use sqlparser::dialect::{GenericDialect, SQLiteDialect};
use sqlparser::parser::Parser;
use tracing::trace;

/// Parse `sql` into its statements; empty when no dialect accepts it.
#[must_use]
pub fn parse(sql: &str) -> Vec<Statement> {
    Parser::parse_sql(&SQLiteDialect {}, sql)
        .or_else(|_| Parser::parse_sql(&GenericDialect {}, sql))
        .unwrap_or_else(|err| {
            trace!(%err, sql, "statement text not parsed");
            Vec::new()
        })
}

/// A statement event paired with its parsed statements.
pub struct AnalyzedStatement<'a> {
    pub event: &'a StatementEvent,
    statements: Vec<Statement>,
}

impl<'a> AnalyzedStatement<'a> {
    #[must_use]
    pub fn new(event: &'a StatementEvent) -> Self {
        Self {
            event,
            statements: parse(&event.sql),
        }
    }

    #[must_use]
    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    /// Key for exact-duplicate detection: the shape plus every value the
    /// execution carried.
    #[must_use]
    pub fn exact_key(&self) -> (String, Vec<String>) {
        (self.shape(), self.value_signature())
    }

    #[must_use]
    pub fn shape(&self) -> String {
        shape::shape(&self.statements, &self.event.sql)
    }

    #[must_use]
    pub fn value_signature(&self) -> Vec<String> {
        shape::value_signature(&self.statements, &self.event.params)
    }

    /// Selected column names; empty for non-select statements.
    #[must_use]
    pub fn selected_columns(&self) -> Vec<String> {
        if self.event.kind == StatementKind::Select {
            columns::selected_columns(&self.statements)
        } else {
            Vec::new()
        }
    }

    /// Updated column names; empty for non-update statements.
    #[must_use]
    pub fn updated_columns(&self) -> Vec<String> {
        if self.event.kind == StatementKind::Update {
            columns::updated_columns(&self.statements)
        } else {
            Vec::new()
        }
    }

    /// Inline literal values of a select/insert/update/delete.
    #[must_use]
    pub fn inline_literals(&self) -> Vec<String> {
        if self.event.kind == StatementKind::Other {
            Vec::new()
        } else {
            literals::inline_literals(&self.statements)
        }
    }

    #[must_use]
    pub fn like_patterns(&self) -> Vec<LikePattern> {
        like::like_patterns(&self.statements, &self.event.params)
    }

    #[must_use]
    pub fn has_leading_wildcard_like(&self) -> bool {
        self.like_patterns()
            .iter()
            .any(LikePattern::has_leading_wildcard)
    }
}
