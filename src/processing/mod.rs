// Processing module for the data cleaning stages
// Author: Gabriel Demetrios Lafis

mod coerce;
mod explode;
mod filter;
mod normalize;
mod report;
mod stats;
mod summary;
mod transform;

pub use coerce::*;
pub use explode::*;
pub use filter::*;
pub use normalize::*;
pub use report::*;
pub use stats::*;
pub use summary::*;
pub use transform::*;

use log::{debug, info};
use thiserror::Error;

use crate::data::{DataError, DataSet, DataType, Schema, SchemaValidator};

/// A single step of the cleaning pipeline
///
/// Stages never mutate their input: each one returns a new dataset and
/// records the rows it excluded in the shared [`DropReport`].
pub trait CleaningStage {
    /// Apply the stage to a dataset and return a new dataset
    fn apply(&self, input: &DataSet, report: &mut DropReport) -> Result<DataSet, ProcessingError>;

    /// Get the stage name
    fn name(&self) -> &str;

    /// Get the stage type
    fn stage_type(&self) -> StageType;
}

/// Represents a stage type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageType {
    Normalize,
    Filter,
    Coerce,
    Explode,
    Derive,
    Bucket,
}

/// A rule refers to the dataset's columns in a way that cannot be satisfied
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("column '{column}' referenced by {context} does not exist")]
    MissingColumn { column: String, context: String },
    #[error("column name '{column}' is ambiguous: produced more than once")]
    Collision { column: String },
    #[error("expected {expected} column names for the header, the input has {found}")]
    HeaderCount { expected: usize, found: usize },
    #[error("column '{column}' referenced by {context} is {found}, not numeric")]
    NotNumeric { column: String, context: String, found: DataType },
}

impl SchemaError {
    pub(crate) fn missing<C: Into<String>, X: Into<String>>(column: C, context: X) -> Self {
        SchemaError::MissingColumn {
            column: column.into(),
            context: context.into(),
        }
    }
}

/// Represents an error in the processing module
#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),
    #[error("Invalid rule: {0}")]
    InvalidRule(String),
    #[error("Data error: {0}")]
    Data(#[from] DataError),
}

/// Look up a column, failing with a [`SchemaError`] naming the referrer
pub(crate) fn require_column(schema: &Schema, column: &str, context: &str) -> Result<usize, SchemaError> {
    schema
        .index_of(column)
        .ok_or_else(|| SchemaError::missing(column, context))
}

/// Look up a column that must hold numbers by the time `context` reads it
pub(crate) fn require_numeric(schema: &Schema, column: &str, context: &str) -> Result<usize, SchemaError> {
    let index = require_column(schema, column, context)?;
    match schema.fields[index].data_type {
        DataType::Numeric => Ok(index),
        found => Err(SchemaError::NotNumeric {
            column: column.to_string(),
            context: context.to_string(),
            found,
        }),
    }
}

/// Pipeline for chaining cleaning stages
pub struct Pipeline {
    name: String,
    stages: Vec<Box<dyn CleaningStage>>,
}

impl Pipeline {
    /// Create a new pipeline with the given name
    pub fn new(name: &str) -> Self {
        Pipeline {
            name: name.to_string(),
            stages: Vec::new(),
        }
    }

    /// Add a stage to the pipeline
    pub fn add<S: CleaningStage + 'static>(mut self, stage: S) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Names of the stages, in execution order
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    /// Execute the pipeline on a dataset
    pub fn execute(&self, input: &DataSet) -> Result<(DataSet, DropReport), ProcessingError> {
        let mut report = DropReport::new(input.len());
        let mut current = input.clone();

        for stage in &self.stages {
            let before = current.len();
            current = stage.apply(&current, &mut report)?;
            debug!(
                "[{}] stage '{}' ({:?}): {} -> {} rows",
                self.name,
                stage.name(),
                stage.stage_type(),
                before,
                current.len()
            );
        }

        report.output_rows = current.len();
        SchemaValidator::validate_dataset(&current)?;

        info!(
            "[{}] cleaned {} rows into {} ({} dropped)",
            self.name,
            report.input_rows,
            report.output_rows,
            report.total_dropped()
        );

        Ok((current, report))
    }
}
