// Derived columns and categorical bucketing
// Author: Gabriel Demetrios Lafis

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::data::{DataSet, DataType, Field, Row, Value};
use crate::utils::{validate_bins, validate_positive};
use super::{require_column, require_numeric, CleaningStage, DropReport, ProcessingError, SchemaError, StageType};

/// Formula computing a derived column from other columns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum Formula {
    /// `numerator / denominator`; missing when the denominator is zero
    Ratio { numerator: String, denominator: String },
    /// `left - right`
    Difference { left: String, right: String },
    /// `floor(column / width) * width`, e.g. the decade of a year
    FloorBucket { column: String, width: f64 },
    /// Calendar year of a date column
    Year { column: String },
}

impl Formula {
    /// Columns the formula reads, in evaluation order
    pub fn operands(&self) -> Vec<&str> {
        match self {
            Formula::Ratio { numerator, denominator } => vec![numerator.as_str(), denominator.as_str()],
            Formula::Difference { left, right } => vec![left.as_str(), right.as_str()],
            Formula::FloorBucket { column, .. } | Formula::Year { column } => vec![column.as_str()],
        }
    }

    /// Evaluate against operand values given in [`Formula::operands`] order
    ///
    /// Any missing operand yields a missing result.
    pub fn evaluate(&self, operands: &[&Value]) -> Value {
        let number = |i: usize| operands.get(i).and_then(|v| v.as_number());

        match self {
            Formula::Ratio { .. } => match (number(0), number(1)) {
                (Some(n), Some(d)) if d != 0.0 => Value::number(n / d),
                _ => Value::Null,
            },
            Formula::Difference { .. } => match (number(0), number(1)) {
                (Some(a), Some(b)) => Value::number(a - b),
                _ => Value::Null,
            },
            Formula::FloorBucket { width, .. } => match number(0) {
                Some(x) if *width > 0.0 => Value::number((x / width).floor() * width),
                _ => Value::Null,
            },
            Formula::Year { .. } => operands
                .first()
                .and_then(|v| v.as_date())
                .map(|date| Value::Number(f64::from(date.year())))
                .unwrap_or(Value::Null),
        }
    }
}

/// A named derived column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedColumn {
    pub name: String,
    pub formula: Formula,
}

impl DerivedColumn {
    pub fn new(name: &str, formula: Formula) -> Self {
        DerivedColumn {
            name: name.to_string(),
            formula,
        }
    }
}

/// Which end of each bin is inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Closed {
    /// `(lo, hi]`
    Right,
    /// `[lo, hi)`
    Left,
}

impl Default for Closed {
    fn default() -> Self {
        Closed::Right
    }
}

/// Map a numeric column onto named bins
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketRule {
    pub column: String,
    pub target: String,
    /// Strictly ascending; bin `i` spans `edges[i]..edges[i + 1]`
    pub edges: Vec<f64>,
    pub labels: Vec<String>,
    #[serde(default)]
    pub closed: Closed,
}

impl BucketRule {
    pub fn new(column: &str, target: &str, edges: Vec<f64>, labels: Vec<&str>) -> Self {
        BucketRule {
            column: column.to_string(),
            target: target.to_string(),
            edges,
            labels: labels.into_iter().map(str::to_string).collect(),
            closed: Closed::default(),
        }
    }

    pub fn closed(mut self, closed: Closed) -> Self {
        self.closed = closed;
        self
    }

    /// Label of the bin holding `x`, or `None` outside every bin
    pub fn assign(&self, x: f64) -> Option<&str> {
        self.edges
            .windows(2)
            .position(|pair| match self.closed {
                Closed::Right => pair[0] < x && x <= pair[1],
                Closed::Left => pair[0] <= x && x < pair[1],
            })
            .and_then(|i| self.labels.get(i))
            .map(String::as_str)
    }
}

fn ensure_new_column(fields: &[Field], name: &str) -> Result<(), SchemaError> {
    if fields.iter().any(|field| field.name == name) {
        Err(SchemaError::Collision { column: name.to_string() })
    } else {
        Ok(())
    }
}

/// Append derived columns, evaluated in order
///
/// A formula may read columns derived earlier in the same transform.
pub struct DerivedColumnTransform {
    columns: Vec<DerivedColumn>,
}

impl DerivedColumnTransform {
    pub fn new(columns: Vec<DerivedColumn>) -> Self {
        DerivedColumnTransform { columns }
    }
}

impl CleaningStage for DerivedColumnTransform {
    fn apply(&self, input: &DataSet, _report: &mut DropReport) -> Result<DataSet, ProcessingError> {
        let mut schema = input.schema.clone();
        let mut rows: Vec<Vec<Value>> = input.data.iter().map(|row| row.values.clone()).collect();

        for derived in &self.columns {
            if let Formula::FloorBucket { width, .. } = &derived.formula {
                validate_positive(*width, "floor-bucket width").map_err(ProcessingError::InvalidRule)?;
            }

            let context = format!("derived column '{}'", derived.name);
            let indices = derived
                .formula
                .operands()
                .into_iter()
                .map(|column| require_column(&schema, column, &context))
                .collect::<Result<Vec<_>, _>>()?;
            ensure_new_column(&schema.fields, &derived.name)?;

            for values in &mut rows {
                let operands: Vec<&Value> = indices.iter().map(|&i| &values[i]).collect();
                let value = derived.formula.evaluate(&operands);
                values.push(value);
            }
            schema.fields.push(Field::derived(derived.name.as_str(), DataType::Numeric));
        }

        let mut result = DataSet::derived_from(schema, input);
        result.data = rows.into_iter().map(Row::new).collect();
        Ok(result)
    }

    fn name(&self) -> &str {
        "derive"
    }

    fn stage_type(&self) -> StageType {
        StageType::Derive
    }
}

/// Bucket numeric columns into new categorical columns
pub struct BucketTransform {
    rules: Vec<BucketRule>,
}

impl BucketTransform {
    pub fn new(rules: Vec<BucketRule>) -> Self {
        BucketTransform { rules }
    }
}

impl CleaningStage for BucketTransform {
    fn apply(&self, input: &DataSet, report: &mut DropReport) -> Result<DataSet, ProcessingError> {
        let mut schema = input.schema.clone();
        let mut rows: Vec<Vec<Value>> = input.data.iter().map(|row| row.values.clone()).collect();

        for rule in &self.rules {
            validate_bins(&rule.edges, &rule.labels).map_err(ProcessingError::InvalidRule)?;

            let context = format!("bucket column '{}'", rule.target);
            let index = require_numeric(&schema, &rule.column, &context)?;
            ensure_new_column(&schema.fields, &rule.target)?;

            for values in &mut rows {
                let bucket = match values[index].as_number() {
                    Some(x) => match rule.assign(x) {
                        Some(label) => Value::category(label),
                        None => {
                            report.record_degraded(&rule.target);
                            Value::Null
                        }
                    },
                    None => Value::Null,
                };
                values.push(bucket);
            }
            schema.fields.push(Field::derived(rule.target.as_str(), DataType::Categorical));
        }

        let mut result = DataSet::derived_from(schema, input);
        result.data = rows.into_iter().map(Row::new).collect();
        Ok(result)
    }

    fn name(&self) -> &str {
        "bucket"
    }

    fn stage_type(&self) -> StageType {
        StageType::Bucket
    }
}
