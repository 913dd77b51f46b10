//! Detection of values written inline instead of bound as parameters.
//!
//! A literal counts when it sits in a value position:
//! - an operand of a comparison whose other side is not a literal too,
//! - the pattern of `LIKE`/`ILIKE`/`GLOB`/`REGEXP`/`MATCH`,
//! - a bound of `BETWEEN`, an item of an `IN` list,
//! - a cell of a `VALUES` row or the value of a `SET` assignment.
//!
//! Signed numbers count as one literal. Tautologies such as `1 = 1` and
//! `LIMIT`/`OFFSET` counts are not values supplied by the caller.

use std::ops::ControlFlow;

use sqlparser::ast::{
    BinaryOperator, Expr, Query, SetExpr, Statement, UnaryOperator, Value, Visit, Visitor,
};

/// Inline literal values, rendered as SQL text, in statement order.
#[must_use]
pub fn inline_literals(statements: &[Statement]) -> Vec<String> {
    let mut collector = LiteralCollector::default();
    for statement in statements {
        let _ = statement.visit(&mut collector);
    }
    collector.found
}

/// SQL text of `expr` when it is a literal value, looking through a sign and
/// parentheses. Placeholders and `NULL` are not literals.
#[must_use]
pub fn literal_text(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Value(v) if !matches!(v.value, Value::Placeholder(_) | Value::Null) => {
            Some(v.value.to_string())
        }
        Expr::UnaryOp {
            op: UnaryOperator::Minus | UnaryOperator::Plus,
            expr: inner,
        } => literal_text(inner).map(|_| expr.to_string()),
        Expr::Nested(inner) => literal_text(inner),
        _ => None,
    }
}

fn is_comparison(op: &BinaryOperator) -> bool {
    matches!(
        op,
        BinaryOperator::Eq
            | BinaryOperator::NotEq
            | BinaryOperator::Lt
            | BinaryOperator::LtEq
            | BinaryOperator::Gt
            | BinaryOperator::GtEq
    ) || matches!(op.to_string().as_str(), "GLOB" | "REGEXP" | "MATCH")
}

#[derive(Default)]
struct LiteralCollector {
    found: Vec<String>,
}

impl Visitor for LiteralCollector {
    type Break = ();

    fn pre_visit_query(&mut self, query: &Query) -> ControlFlow<()> {
        if let SetExpr::Values(values) = query.body.as_ref() {
            self.found
                .extend(values.rows.iter().flatten().filter_map(literal_text));
        }
        ControlFlow::Continue(())
    }

    fn pre_visit_statement(&mut self, statement: &Statement) -> ControlFlow<()> {
        if let Statement::Update { assignments, .. } = statement {
            self.found
                .extend(assignments.iter().filter_map(|a| literal_text(&a.value)));
        }
        ControlFlow::Continue(())
    }

    fn pre_visit_expr(&mut self, expr: &Expr) -> ControlFlow<()> {
        match expr {
            Expr::BinaryOp { left, op, right } if is_comparison(op) => {
                match (literal_text(left), literal_text(right)) {
                    (Some(value), None) | (None, Some(value)) => self.found.push(value),
                    _ => {}
                }
            }
            Expr::Like { pattern, .. } | Expr::ILike { pattern, .. } => {
                self.found.extend(literal_text(pattern));
            }
            Expr::Between { low, high, .. } => {
                self.found.extend(literal_text(low));
                self.found.extend(literal_text(high));
            }
            Expr::InList { list, .. } => {
                self.found.extend(list.iter().filter_map(literal_text));
            }
            _ => {}
        }
        ControlFlow::Continue(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::parse;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn literals(sql: &str) -> Vec<String> {
        inline_literals(&parse(sql))
    }

    #[rstest]
    #[case("SELECT * FROM book WHERE id = ?", &[])]
    #[case("SELECT * FROM book WHERE id = 42", &["42"])]
    #[case("SELECT * FROM book WHERE title LIKE 'Rust%'", &["'Rust%'"])]
    #[case("SELECT * FROM book WHERE id IN (1, 2)", &["1", "2"])]
    #[case("SELECT * FROM book WHERE id IN (?, ?)", &[])]
    #[case("SELECT * FROM book WHERE year BETWEEN 1990 AND 2000", &["1990", "2000"])]
    #[case("SELECT * FROM book WHERE 1 = 1 AND id = ?", &[])]
    #[case("SELECT * FROM book LIMIT 10 OFFSET 20", &[])]
    #[case("INSERT INTO book (id, title) VALUES (1, 'x'), (2, 'y')", &["1", "'x'", "2", "'y'"])]
    #[case("INSERT INTO book (id, title) VALUES (?, ?)", &[])]
    #[case("UPDATE book SET title = 'x' WHERE id = ?", &["'x'"])]
    #[case("UPDATE book SET stock = stock - 1 WHERE id = ?", &[])]
    #[case("DELETE FROM book WHERE id = 3", &["3"])]
    fn value_positions(#[case] sql: &str, #[case] expected: &[&str]) {
        assert_eq!(literals(sql), expected);
    }

    #[rstest]
    #[case("SELECT id FROM account WHERE balance < -100", &["-100"])]
    #[case("SELECT id FROM account WHERE balance > +5", &["+5"])]
    #[case("SELECT id FROM account WHERE rate = -1.5", &["-1.5"])]
    #[case("SELECT id FROM account WHERE balance BETWEEN -10 AND 10", &["-10", "10"])]
    #[case("INSERT INTO account (id, balance) VALUES (?, -3)", &["-3"])]
    fn signed_numbers_are_literals(#[case] sql: &str, #[case] expected: &[&str]) {
        assert_eq!(literals(sql), expected);
    }

    #[rstest]
    #[case("SELECT * FROM book WHERE 5 = id", &["5"])]
    #[case("SELECT * FROM book WHERE 'novel' <> kind AND id = ?", &["'novel'"])]
    #[case("SELECT * FROM book WHERE -1 < stock", &["-1"])]
    fn literal_left_of_comparison(#[case] sql: &str, #[case] expected: &[&str]) {
        assert_eq!(literals(sql), expected);
    }

    #[test]
    fn function_arguments_are_not_values() {
        assert_eq!(
            literals("SELECT substr(title, 1, 3) FROM book WHERE id = ?"),
            Vec::<String>::new()
        );
    }

    #[test]
    fn subquery_values_are_found() {
        let sql = "SELECT * FROM book WHERE author_id IN (SELECT id FROM author WHERE name = 'x')";
        assert_eq!(literals(sql), vec!["'x'"]);
    }
}
