// Row accounting for a pipeline run
// Author: Gabriel Demetrios Lafis

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// Stage key for rows missing a required value
pub const MISSING_REQUIRED: &str = "missing-required";
/// Stage key for rows whose required value failed coercion
pub const FAILED_COERCION: &str = "failed-coercion";
/// Stage key for rows outside an allowed range
pub const OUTLIER: &str = "outlier";
/// Stage key for exact-duplicate rows
pub const DUPLICATE: &str = "duplicate";

/// Row counts around the explode step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExplodeCounts {
    pub rows_before: usize,
    pub rows_after: usize,
    /// Rows dropped by stages that ran before the explode
    pub dropped_before: usize,
}

/// Rows removed at each stage of a pipeline run
///
/// A dropped row is counted once, under the first stage that excluded it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DropReport {
    pub input_rows: usize,
    pub output_rows: usize,
    pub drops: BTreeMap<String, usize>,
    /// Values that were present but degraded to missing, per column
    pub degraded_values: BTreeMap<String, usize>,
    pub explode: Option<ExplodeCounts>,
}

impl DropReport {
    pub fn new(input_rows: usize) -> Self {
        let drops = [MISSING_REQUIRED, FAILED_COERCION, OUTLIER, DUPLICATE]
            .iter()
            .map(|stage| (stage.to_string(), 0))
            .collect();

        DropReport {
            input_rows,
            output_rows: input_rows,
            drops,
            degraded_values: BTreeMap::new(),
            explode: None,
        }
    }

    /// Record rows dropped by a stage
    pub fn record_drops(&mut self, stage: &str, count: usize) {
        *self.drops.entry(stage.to_string()).or_insert(0) += count;
    }

    /// Record a value degraded to missing in a column
    pub fn record_degraded(&mut self, column: &str) {
        *self.degraded_values.entry(column.to_string()).or_insert(0) += 1;
    }

    /// Record the row counts around the explode step
    pub fn record_explode(&mut self, rows_before: usize, rows_after: usize) {
        self.explode = Some(ExplodeCounts {
            rows_before,
            rows_after,
            dropped_before: self.total_dropped(),
        });
    }

    pub fn dropped(&self, stage: &str) -> usize {
        self.drops.get(stage).copied().unwrap_or(0)
    }

    pub fn total_dropped(&self) -> usize {
        self.drops.values().sum()
    }

    pub fn degraded(&self, column: &str) -> usize {
        self.degraded_values.get(column).copied().unwrap_or(0)
    }

    /// Check that every input row is accounted for
    ///
    /// With an explode step the books are balanced on each side of it,
    /// because explosion multiplies rows without dropping any.
    pub fn reconciles(&self) -> bool {
        match self.explode {
            None => self.input_rows == self.total_dropped() + self.output_rows,
            Some(counts) => {
                let dropped_after = self.total_dropped() - counts.dropped_before;
                self.input_rows == counts.dropped_before + counts.rows_before
                    && counts.rows_after == dropped_after + self.output_rows
            }
        }
    }
}

impl fmt::Display for DropReport {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "input rows:  {}", self.input_rows)?;
        if let Some(counts) = self.explode {
            if counts.rows_before != counts.rows_after {
                writeln!(
                    f,
                    "exploded:    {} -> {} rows",
                    counts.rows_before, counts.rows_after
                )?;
            }
        }
        for (stage, count) in &self.drops {
            writeln!(f, "dropped ({}): {}", stage, count)?;
        }
        for (column, count) in &self.degraded_values {
            writeln!(f, "degraded to missing ({}): {}", column, count)?;
        }
        write!(f, "output rows: {}", self.output_rows)
    }
}
