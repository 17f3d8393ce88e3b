// Row filters for data cleaning
// Author: Gabriel Demetrios Lafis

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::data::{DataSet, Row, Value};
use super::{
    require_column, require_numeric, CleaningStage, DropReport, ProcessingError, StageType,
    DUPLICATE, MISSING_REQUIRED, OUTLIER,
};

/// Keep the rows of `input` accepted by `keep`, counting the rest under `stage`
fn retain_rows<F>(input: &DataSet, report: &mut DropReport, stage: &str, mut keep: F) -> DataSet
where
    F: FnMut(&Row) -> bool,
{
    let mut result = DataSet::derived_from(input.schema.clone(), input);
    result.data = input.data.iter().filter(|row| keep(*row)).cloned().collect();

    report.record_drops(stage, input.len() - result.len());
    result
}

/// Drop rows missing a value in any of the required columns
pub struct RequiredFilter {
    columns: Vec<String>,
}

impl RequiredFilter {
    pub fn new(columns: Vec<String>) -> Self {
        RequiredFilter { columns }
    }
}

impl CleaningStage for RequiredFilter {
    fn apply(&self, input: &DataSet, report: &mut DropReport) -> Result<DataSet, ProcessingError> {
        let indices = self
            .columns
            .iter()
            .map(|column| require_column(&input.schema, column, "a required field rule"))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(retain_rows(input, report, MISSING_REQUIRED, |row| {
            indices.iter().all(|&i| !row.values[i].is_missing())
        }))
    }

    fn name(&self) -> &str {
        "required_fields"
    }

    fn stage_type(&self) -> StageType {
        StageType::Filter
    }
}

/// Inclusive numeric range a column must fall in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangePredicate {
    pub column: String,
    pub min: f64,
    pub max: f64,
    /// Keep rows where the column is missing instead of dropping them
    #[serde(default)]
    pub keep_missing: bool,
}

impl RangePredicate {
    pub fn new(column: &str, min: f64, max: f64) -> Self {
        RangePredicate {
            column: column.to_string(),
            min,
            max,
            keep_missing: false,
        }
    }

    pub fn keep_missing(mut self, keep: bool) -> Self {
        self.keep_missing = keep;
        self
    }

    pub fn accepts(&self, value: &Value) -> bool {
        match value.as_number() {
            Some(n) => self.min <= n && n <= self.max,
            None => self.keep_missing && value.is_null(),
        }
    }
}

/// Drop rows failing any range predicate
pub struct RangeFilter {
    predicates: Vec<RangePredicate>,
}

impl RangeFilter {
    pub fn new(predicates: Vec<RangePredicate>) -> Self {
        RangeFilter { predicates }
    }
}

impl CleaningStage for RangeFilter {
    fn apply(&self, input: &DataSet, report: &mut DropReport) -> Result<DataSet, ProcessingError> {
        let checks = self
            .predicates
            .iter()
            .map(|predicate| {
                require_numeric(&input.schema, &predicate.column, "a range rule")
                    .map(|index| (index, predicate))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(retain_rows(input, report, OUTLIER, |row| {
            checks
                .iter()
                .all(|(index, predicate)| predicate.accepts(&row.values[*index]))
        }))
    }

    fn name(&self) -> &str {
        "outliers"
    }

    fn stage_type(&self) -> StageType {
        StageType::Filter
    }
}

/// Drop rows equal in every column to an earlier row
pub struct DuplicateFilter;

impl CleaningStage for DuplicateFilter {
    fn apply(&self, input: &DataSet, report: &mut DropReport) -> Result<DataSet, ProcessingError> {
        let mut seen = HashSet::with_capacity(input.len());
        Ok(retain_rows(input, report, DUPLICATE, |row| seen.insert(row.key())))
    }

    fn name(&self) -> &str {
        "duplicates"
    }

    fn stage_type(&self) -> StageType {
        StageType::Filter
    }
}
