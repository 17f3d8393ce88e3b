// Rust Data Cleaning Pipeline
// Author: Gabriel Demetrios Lafis

//! # Rust Data Cleaning Pipeline
//!
//! Turns raw CSV survey extracts into analysis-ready datasets, driven by a
//! declarative rule table per dataset.
//!
//! ## Features
//!
//! - Column name normalization, positional headers and renames
//! - Required-field filtering
//! - Numeric, range-average, categorical, date and list coercion
//! - Row explosion of delimiter-joined list columns
//! - Derived columns and categorical bucketing
//! - Outlier and duplicate filtering with a per-stage drop report
//!
//! ## Example
//!
//! ```rust
//! use rust_data_cleaning_pipeline::{
//!     data::{CsvSource, Value},
//!     processing::{CoercionKind, RangePredicate},
//!     rules::{CleaningRules, FieldRule},
//! };
//!
//! let raw = CsvSource::new("inline", true, ',')
//!     .read_from("Title,Rating,Genres\nX,4,Drama|Comedy\nY,6,Drama\n".as_bytes())
//!     .unwrap();
//!
//! let rules = CleaningRules::new("ratings")
//!     .field("rating", FieldRule::numeric().required())
//!     .field("genres", FieldRule::new(CoercionKind::SplitExplode { delimiter: "|".to_string() }))
//!     .range(RangePredicate::new("rating", 0.5, 5.0));
//!
//! let (cleaned, report) = rules.clean(&raw).unwrap();
//!
//! assert_eq!(cleaned.len(), 2);
//! assert_eq!(cleaned.value(1, "genres"), Some(&Value::category("Comedy")));
//! assert_eq!(report.dropped("outlier"), 1);
//! assert!(report.reconciles());
//! ```

pub mod data;
pub mod processing;
pub mod rules;
pub mod utils;

// Re-export main types
pub use data::{DataSet, DataType, Field, Row, Schema, Value};
pub use processing::{DropReport, Pipeline, ProcessingError, SchemaError};
pub use rules::{clean, CleaningRules, FieldRule};
pub use utils::Config;
