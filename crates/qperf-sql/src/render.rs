//! Text rendering of statements for issue messages and reports.

use std::fmt::Write as _;

use qperf_config::DisplayConfig;
use qperf_core::StatementEvent;

/// Collapse whitespace and cut to `max_len` characters (`0` keeps everything).
#[must_use]
pub fn truncate_sql(sql: &str, max_len: usize) -> String {
    let collapsed = sql.split_whitespace().collect::<Vec<_>>().join(" ");
    if max_len == 0 || collapsed.chars().count() <= max_len {
        return collapsed;
    }
    let mut cut: String = collapsed.chars().take(max_len).collect();
    cut.push_str("...");
    cut
}

/// One statement as `sql [params: ...]`, with its batch size if batched.
#[must_use]
pub fn render_statement(event: &StatementEvent, display: &DisplayConfig) -> String {
    let mut line = truncate_sql(&event.sql, display.max_sql_length);
    if !event.params.is_empty() {
        let params: Vec<String> = event.params.iter().map(ToString::to_string).collect();
        let _ = write!(line, " [params: {}]", params.join(", "));
    }
    if let Some(size) = event.batch_size {
        let _ = write!(line, " (batch of {size})");
    }
    line
}

/// Tab-indented statement lines, one per event.
#[must_use]
pub fn render_statements<'a>(
    events: impl IntoIterator<Item = &'a StatementEvent>,
    display: &DisplayConfig,
) -> String {
    events
        .into_iter()
        .map(|event| format!("\t{}\n", render_statement(event, display)))
        .collect()
}
