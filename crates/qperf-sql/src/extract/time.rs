use std::time::Duration;

use qperf_core::{Measure, StatementEvent};

use super::MeasureExtractor;

/// Longest single execution; zero when nothing ran.
#[derive(Debug, Clone, Copy)]
pub struct MaxExecutionTimeExtractor;

impl MeasureExtractor for MaxExecutionTimeExtractor {
    fn name(&self) -> &'static str {
        "max_execution_time"
    }

    fn extract(&self, events: &[StatementEvent]) -> Measure {
        let max = events
            .iter()
            .map(StatementEvent::elapsed)
            .max()
            .unwrap_or(Duration::ZERO);
        Measure::Duration(max)
    }
}
