//! Grouping of repeated select executions.

use std::collections::{HashMap, HashSet};

use qperf_core::{StatementEvent, StatementKind};

use super::AnalyzedStatement;

/// Select executions sharing a shape and every value they carried.
#[derive(Debug)]
pub struct DuplicateGroup<'a> {
    pub sql: String,
    pub executions: Vec<&'a StatementEvent>,
}

/// Select executions sharing a shape but carrying different values.
#[derive(Debug)]
pub struct ShapeGroup<'a> {
    pub shape: String,
    pub executions: Vec<&'a StatementEvent>,
    pub distinct_values: usize,
}

/// Exact duplicates among the select events, in order of first execution.
#[must_use]
pub fn exact_duplicate_selects(events: &[StatementEvent]) -> Vec<DuplicateGroup<'_>> {
    let mut index: HashMap<(String, Vec<String>), usize> = HashMap::new();
    let mut groups: Vec<DuplicateGroup<'_>> = Vec::new();
    for event in selects(events) {
        let key = AnalyzedStatement::new(event).exact_key();
        let sql = key.0.clone();
        let slot = *index.entry(key).or_insert_with(|| {
            groups.push(DuplicateGroup {
                sql,
                executions: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].executions.push(event);
    }
    groups.retain(|g| g.executions.len() > 1);
    groups
}

/// Select shapes executed with more than one set of values, in order of
/// first execution.
#[must_use]
pub fn same_shape_different_values(events: &[StatementEvent]) -> Vec<ShapeGroup<'_>> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<(ShapeGroup<'_>, HashSet<Vec<String>>)> = Vec::new();
    for event in selects(events) {
        let analyzed = AnalyzedStatement::new(event);
        let shape = analyzed.shape();
        let slot = *index.entry(shape.clone()).or_insert_with(|| {
            groups.push((
                ShapeGroup {
                    shape,
                    executions: Vec::new(),
                    distinct_values: 0,
                },
                HashSet::new(),
            ));
            groups.len() - 1
        });
        let (group, signatures) = &mut groups[slot];
        group.executions.push(event);
        signatures.insert(analyzed.value_signature());
        group.distinct_values = signatures.len();
    }
    groups
        .into_iter()
        .map(|(group, _)| group)
        .filter(|g| g.distinct_values > 1)
        .collect()
}

fn selects(events: &[StatementEvent]) -> impl Iterator<Item = &StatementEvent> {
    events.iter().filter(|e| e.kind == StatementKind::Select)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{event, statement};
    use pretty_assertions::assert_eq;
    use qperf_core::ParamValue;

    fn by_id(id: i64) -> StatementEvent {
        statement(
            "SELECT * FROM book WHERE id = ?",
            vec![ParamValue::Integer(id)],
        )
    }

    #[test]
    fn identical_values_are_exact_duplicates() {
        let events = vec![by_id(1), by_id(1), event("SELECT 1")];
        let groups = exact_duplicate_selects(&events);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].executions.len(), 2);
        assert_eq!(groups[0].sql, "select * from book where id = ?");
        assert!(same_shape_different_values(&events).is_empty());
    }

    #[test]
    fn different_values_form_a_shape_group() {
        let events = vec![by_id(1), by_id(2), by_id(3), by_id(3)];
        assert_eq!(exact_duplicate_selects(&events).len(), 1);

        let shapes = same_shape_different_values(&events);
        assert_eq!(shapes.len(), 1);
        assert_eq!(shapes[0].executions.len(), 4);
        assert_eq!(shapes[0].distinct_values, 3);
    }

    #[test]
    fn inline_literals_count_as_values() {
        let events = vec![
            event("SELECT * FROM author WHERE id = 1"),
            event("select * from author where id = 2"),
        ];
        assert!(exact_duplicate_selects(&events).is_empty());
        assert_eq!(same_shape_different_values(&events).len(), 1);
    }

    #[test]
    fn signed_values_are_not_duplicates() {
        let events = vec![
            event("SELECT id FROM account WHERE balance < -100"),
            event("SELECT id FROM account WHERE balance < 100"),
        ];
        assert!(exact_duplicate_selects(&events).is_empty());
        assert_eq!(same_shape_different_values(&events).len(), 1);
    }

    #[test]
    fn structural_differences_separate_groups() {
        let events = vec![
            event("SELECT * FROM book WHERE id = 1"),
            event("SELECT * FROM author WHERE id = 2"),
            event("SELECT title FROM book WHERE id = 3"),
        ];
        assert!(same_shape_different_values(&events).is_empty());
    }

    #[test]
    fn writes_are_ignored() {
        let events = vec![
            event("DELETE FROM book WHERE id = 1"),
            event("DELETE FROM book WHERE id = 1"),
        ];
        assert!(exact_duplicate_selects(&events).is_empty());
    }
}
