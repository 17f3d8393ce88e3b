// Grouped summaries over cleaned data
// Author: Gabriel Demetrios Lafis

use std::collections::BTreeMap;

use crate::data::{DataSet, DataType, Field, Row, Schema, Value, ValueKey};
use super::{mean, median, require_column, ProcessingError};

/// Count, mean and median of a numeric column per group
///
/// Rows whose group value is missing are skipped; missing values in the
/// summarized column do not count. Groups come out sorted by key.
pub struct GroupSummary {
    group_by: String,
    value: String,
}

impl GroupSummary {
    pub fn new(group_by: &str, value: &str) -> Self {
        GroupSummary {
            group_by: group_by.to_string(),
            value: value.to_string(),
        }
    }

    pub fn process(&self, input: &DataSet) -> Result<DataSet, ProcessingError> {
        let group_index = require_column(&input.schema, &self.group_by, "a summary")?;
        let value_index = require_column(&input.schema, &self.value, "a summary")?;

        let mut groups: BTreeMap<ValueKey, (Value, Vec<f64>)> = BTreeMap::new();
        for row in &input.data {
            let group = &row.values[group_index];
            if group.is_missing() {
                continue;
            }

            let entry = groups
                .entry(group.key())
                .or_insert_with(|| (group.clone(), Vec::new()));
            if let Some(n) = row.values[value_index].as_number() {
                entry.1.push(n);
            }
        }

        let schema = Schema::new(vec![
            input.schema.fields[group_index].clone(),
            Field::derived("count", DataType::Numeric),
            Field::derived("mean", DataType::Numeric),
            Field::derived("median", DataType::Numeric),
        ]);
        let mut result = DataSet::derived_from(schema, input);

        for (_, (group, mut values)) in groups {
            let count = Value::Number(values.len() as f64);
            let avg = mean(&values).map(Value::Number).unwrap_or(Value::Null);
            let mid = median(&mut values).map(Value::Number).unwrap_or(Value::Null);
            result.add_row(Row::new(vec![group, count, avg, mid]))?;
        }

        result.metadata.add("summary", format!("{} by {}", self.value, self.group_by));
        Ok(result)
    }
}
