//! Selected and updated column extraction.

use sqlparser::ast::{
    AssignmentTarget, Expr, Ident, ObjectName, Query, SelectItem, SetExpr, Statement,
};

/// Column labels of the outermost select list; `*` and `t.*` are reported as
/// `*`, aliases win over the expression, other expressions keep their text.
#[must_use]
pub fn selected_columns(statements: &[Statement]) -> Vec<String> {
    statements
        .iter()
        .flat_map(|statement| match statement {
            Statement::Query(query) => query_columns(query),
            _ => Vec::new(),
        })
        .collect()
}

/// Column names assigned in the `SET` clause of an update.
#[must_use]
pub fn updated_columns(statements: &[Statement]) -> Vec<String> {
    statements
        .iter()
        .flat_map(|statement| match statement {
            Statement::Update { assignments, .. } => assignments
                .iter()
                .flat_map(|assignment| match &assignment.target {
                    AssignmentTarget::ColumnName(name) => vec![object_label(name)],
                    AssignmentTarget::Tuple(names) => names.iter().map(object_label).collect(),
                })
                .collect(),
            _ => Vec::new(),
        })
        .collect()
}

fn query_columns(query: &Query) -> Vec<String> {
    set_expr_columns(&query.body)
}

/// Compound selects report the columns of their first branch.
fn set_expr_columns(body: &SetExpr) -> Vec<String> {
    match body {
        SetExpr::Select(select) => select.projection.iter().map(item_label).collect(),
        SetExpr::Query(query) => query_columns(query),
        SetExpr::SetOperation { left, .. } => set_expr_columns(left),
        _ => Vec::new(),
    }
}

fn item_label(item: &SelectItem) -> String {
    match item {
        SelectItem::UnnamedExpr(expr) => expr_label(expr),
        SelectItem::ExprWithAlias { alias, .. } => ident_label(alias),
        _ => "*".to_string(),
    }
}

fn expr_label(expr: &Expr) -> String {
    match expr {
        Expr::Identifier(ident) => ident_label(ident),
        Expr::CompoundIdentifier(parts) => parts
            .last()
            .map_or_else(|| expr.to_string(), ident_label),
        _ => expr.to_string(),
    }
}

/// Unquoted identifiers are case-insensitive and reported lower-cased.
fn ident_label(ident: &Ident) -> String {
    if ident.quote_style.is_some() {
        ident.value.clone()
    } else {
        ident.value.to_lowercase()
    }
}

/// Last segment of a possibly qualified name.
fn object_label(name: &ObjectName) -> String {
    let text = name.to_string();
    let last = text.rsplit('.').next().unwrap_or_default();
    let unquoted = last.trim_matches(|c| matches!(c, '"' | '`' | '[' | ']'));
    if unquoted.len() == last.len() {
        last.to_lowercase()
    } else {
        unquoted.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::parse;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn selected(sql: &str) -> Vec<String> {
        selected_columns(&parse(sql))
    }

    fn updated(sql: &str) -> Vec<String> {
        updated_columns(&parse(sql))
    }

    #[rstest]
    #[case("SELECT id, title FROM book", &["id", "title"])]
    #[case("SELECT b.id, b.title AS name FROM book b", &["id", "name"])]
    #[case("SELECT DISTINCT isbn FROM book", &["isbn"])]
    #[case("SELECT *, count(*) total FROM book", &["*", "total"])]
    #[case("SELECT b.* FROM book b", &["*"])]
    #[case("SELECT coalesce(a, b), \"Title\" FROM book", &["coalesce(a, b)", "Title"])]
    #[case("SELECT ID FROM book UNION SELECT id FROM author", &["id"])]
    #[case("SELECT 1", &["1"])]
    fn select_list(#[case] sql: &str, #[case] expected: &[&str]) {
        assert_eq!(selected(sql), expected);
    }

    #[test]
    fn subquery_columns_are_not_counted() {
        let columns = selected(
            "SELECT id, (SELECT max(x) FROM y) AS m FROM book WHERE id IN (SELECT a FROM c)",
        );
        assert_eq!(columns, vec!["id", "m"]);
    }

    #[test]
    fn cte_uses_outer_select() {
        let columns =
            selected("WITH recent AS (SELECT id, title FROM book) SELECT id FROM recent");
        assert_eq!(columns, vec!["id"]);
    }

    #[rstest]
    #[case("UPDATE book SET title = ?, isbn = ? WHERE id = ?", &["title", "isbn"])]
    #[case("UPDATE book SET Title = 'x'", &["title"])]
    #[case("UPDATE book SET stock = stock - 1, sold = coalesce(sold, 0) + 1", &["stock", "sold"])]
    #[case("DELETE FROM book", &[])]
    fn set_list(#[case] sql: &str, #[case] expected: &[&str]) {
        assert_eq!(updated(sql), expected);
    }
}
