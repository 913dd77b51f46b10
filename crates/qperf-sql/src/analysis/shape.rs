//! Canonical statement text used to group executions.
//!
//! The *shape* of a statement is its lower-cased rendering with every literal
//! and placeholder replaced by `?`, signed numbers folded into one value and
//! `IN (...)` value lists collapsed to `in (?)`. Executions differing only by
//! values share a shape; the *value signature* lists what they carried.

use std::ops::ControlFlow;

use qperf_core::ParamValue;
use sqlparser::ast::{
    Expr, Statement, UnaryOperator, Value, visit_expressions, visit_expressions_mut,
};

use super::parse;

/// Shape of already parsed statements. Text that did not parse falls back to
/// its lower-cased words.
#[must_use]
pub fn shape(statements: &[Statement], sql: &str) -> String {
    if statements.is_empty() {
        return sql
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
    }
    statements
        .iter()
        .map(|statement| {
            let mut statement = statement.clone();
            let _ = visit_expressions_mut(&mut statement, |expr| {
                erase_values(expr);
                ControlFlow::<()>::Continue(())
            });
            statement.to_string().to_lowercase()
        })
        .collect::<Vec<_>>()
        .join("; ")
}

/// Parse `sql` and return its shape.
#[must_use]
pub fn sql_shape(sql: &str) -> String {
    shape(&parse(sql), sql)
}

/// The values an execution carried: inline values in visiting order, then
/// bound parameters in placeholder order.
#[must_use]
pub fn value_signature(statements: &[Statement], params: &[ParamValue]) -> Vec<String> {
    let mut values = Vec::new();
    for statement in statements {
        let _ = visit_expressions(statement, |expr| {
            match expr {
                // Sign of the value that follows.
                Expr::UnaryOp {
                    op: UnaryOperator::Minus,
                    expr: inner,
                } if is_value(inner) => values.push("-".to_string()),
                Expr::Value(v) if !matches!(v.value, Value::Placeholder(_)) => {
                    values.push(v.value.to_string());
                }
                _ => {}
            }
            ControlFlow::<()>::Continue(())
        });
    }
    values.extend(params.iter().map(ToString::to_string));
    values
}

fn is_value(expr: &Expr) -> bool {
    match expr {
        Expr::Value(_) => true,
        Expr::UnaryOp {
            op: UnaryOperator::Minus | UnaryOperator::Plus,
            expr: inner,
        } => matches!(**inner, Expr::Value(_)),
        _ => false,
    }
}

fn erase_values(expr: &mut Expr) {
    let unsigned = match expr {
        Expr::UnaryOp {
            op: UnaryOperator::Minus | UnaryOperator::Plus,
            expr: inner,
        } if matches!(**inner, Expr::Value(_)) => Some((**inner).clone()),
        _ => None,
    };
    if let Some(inner) = unsigned {
        *expr = inner;
    }
    match expr {
        Expr::Value(v) => v.value = Value::Placeholder("?".to_string()),
        Expr::InList { list, .. } if list.len() > 1 && list.iter().all(is_value) => {
            list.truncate(1);
            if let Some(first) = list.first_mut() {
                erase_values(first);
            }
        }
        _ => {}
    }
}
