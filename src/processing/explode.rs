// Row explosion for list columns
// Author: Gabriel Demetrios Lafis

use log::debug;

use crate::data::{DataSet, Row, Value};
use super::{require_column, CleaningStage, DropReport, ProcessingError, StageType};

/// Replace each row with one row per element of its list columns
///
/// Other columns are copied unchanged. A missing or empty list keeps a single
/// row with a missing value. Several list columns explode one after another,
/// yielding every combination of their elements.
pub struct ExplodeTransform {
    columns: Vec<String>,
}

impl ExplodeTransform {
    pub fn new(columns: Vec<String>) -> Self {
        ExplodeTransform { columns }
    }
}

fn explode_rows(rows: Vec<Row>, index: usize) -> Vec<Row> {
    let mut exploded = Vec::with_capacity(rows.len());

    for row in rows {
        let items = match &row.values[index] {
            Value::List(items) => Some(items.clone()),
            _ => None,
        };

        // Not a list: leave the row as it is
        let items = match items {
            Some(items) => items,
            None => {
                exploded.push(row);
                continue;
            }
        };

        if items.is_empty() {
            let mut values = row.values;
            values[index] = Value::Null;
            exploded.push(Row::new(values));
            continue;
        }

        for item in items {
            let mut values = row.values.clone();
            values[index] = Value::Category(item);
            exploded.push(Row::new(values));
        }
    }

    exploded
}

impl CleaningStage for ExplodeTransform {
    fn apply(&self, input: &DataSet, report: &mut DropReport) -> Result<DataSet, ProcessingError> {
        let indices = self
            .columns
            .iter()
            .map(|column| require_column(&input.schema, column, "a split-explode rule"))
            .collect::<Result<Vec<_>, _>>()?;

        let mut rows = input.data.clone();
        for &index in &indices {
            rows = explode_rows(rows, index);
        }

        let mut result = DataSet::derived_from(input.schema.clone(), input);
        result.data = rows;

        if result.len() != input.len() {
            debug!("exploded {} rows into {}", input.len(), result.len());
        }
        report.record_explode(input.len(), result.len());

        Ok(result)
    }

    fn name(&self) -> &str {
        "explode"
    }

    fn stage_type(&self) -> StageType {
        StageType::Explode
    }
}
