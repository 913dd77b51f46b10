use std::collections::HashMap;
use std::fmt::Write as _;

use qperf_core::PerfIssue;

use super::{PerfIssueVerifier, VerifierInput, VerifyContext, mismatch};
use crate::analysis::shape::sql_shape;
use crate::error::SqlPerfError;
use crate::recorder::{BatchEntry, Recorder};
use crate::render::truncate_sql;
use crate::suggestion::Suggestion;

/// Flags write statements repeated one round-trip at a time and, when a
/// batch size was declared, batches of another size.
///
/// Writes are grouped by shape, so single-row statements differing only by
/// inline values count together. A batch of one is a round-trip of its own.
/// Batches of one shape must all have the declared size except the last,
/// which may be smaller.
#[derive(Debug, Clone, Copy)]
pub struct BatchingVerifier;

impl PerfIssueVerifier for BatchingVerifier {
    fn verify(
        &self,
        ctx: &VerifyContext<'_>,
        input: VerifierInput<'_>,
    ) -> Result<PerfIssue, SqlPerfError> {
        let VerifierInput::Recorder(Recorder::Batch(recorder)) = input else {
            return Err(mismatch(ctx, "batch", input));
        };
        let groups = group_by_shape(recorder.entries());
        let max_len = ctx.display.max_sql_length;

        let mut findings = String::new();
        for group in &groups {
            let unbatched = group.entries.iter().filter(|e| !e.is_batched()).count();
            if unbatched > 1 {
                let _ = writeln!(
                    findings,
                    "\t{unbatched} separate round-trips: {}",
                    truncate_sql(group.sql, max_len)
                );
            }
        }
        if let Some(expected) = ctx.expectation.batch_size() {
            for group in &groups {
                let sizes: Vec<u32> = group
                    .entries
                    .iter()
                    .filter(|e| e.is_batched())
                    .filter_map(|e| e.batch_size)
                    .collect();
                let wrong = sizes.iter().enumerate().any(|(i, size)| {
                    if i + 1 == sizes.len() {
                        *size > expected
                    } else {
                        *size != expected
                    }
                });
                if wrong {
                    let sizes: Vec<String> = sizes.iter().map(ToString::to_string).collect();
                    let _ = writeln!(
                        findings,
                        "\tbatch sizes [{}] instead of {expected}: {}",
                        sizes.join(", "),
                        truncate_sql(group.sql, max_len)
                    );
                }
            }
        }
        if findings.is_empty() {
            return Ok(PerfIssue::NONE);
        }

        let mut description =
            String::from("Statements were not executed in batch mode as expected\n\n");
        description.push_str(&findings);
        description.push('\n');
        Suggestion::Batching.append_to(&mut description, ctx.frameworks);
        Ok(PerfIssue::new(description))
    }
}

/// Writes of one shape, shown with the text of the first execution.
struct ShapeGroup<'a> {
    sql: &'a str,
    entries: Vec<&'a BatchEntry>,
}

/// Entries grouped by shape, in order of first execution.
fn group_by_shape(entries: &[BatchEntry]) -> Vec<ShapeGroup<'_>> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<ShapeGroup<'_>> = Vec::new();
    for entry in entries {
        let slot = *index.entry(sql_shape(&entry.sql)).or_insert_with(|| {
            groups.push(ShapeGroup {
                sql: &entry.sql,
                entries: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].entries.push(entry);
    }
    groups
}
