// Data module for handling data structures and formats
// Author: Gabriel Demetrios Lafis

mod csv;
mod json;
mod schema;

pub use self::csv::*;
pub use self::json::*;
pub use self::schema::*;

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use thiserror::Error;

/// Represents a generic data source
pub trait DataSource {
    /// Read data from the source
    fn read(&self) -> Result<DataSet, DataError>;

    /// Get the source name
    fn name(&self) -> &str;
}

/// Represents a generic data sink
pub trait DataSink {
    /// Write data to the sink
    fn write(&self, data: &DataSet) -> Result<(), DataError>;

    /// Get the sink name
    fn name(&self) -> &str;
}

/// Represents a dataset with schema and data
#[derive(Debug, Clone, PartialEq)]
pub struct DataSet {
    pub schema: Schema,
    pub data: Vec<Row>,
    pub metadata: Metadata,
}

impl DataSet {
    /// Create a new empty dataset
    pub fn new(schema: Schema) -> Self {
        DataSet {
            schema,
            data: Vec::new(),
            metadata: Metadata::new(),
        }
    }

    /// Create an empty dataset that carries over the metadata of `other`
    pub fn derived_from(schema: Schema, other: &DataSet) -> Self {
        DataSet {
            schema,
            data: Vec::with_capacity(other.data.len()),
            metadata: other.metadata.clone(),
        }
    }

    /// Add a row to the dataset
    pub fn add_row(&mut self, row: Row) -> Result<(), DataError> {
        if row.values.len() != self.schema.fields.len() {
            return Err(DataError::SchemaMismatch {
                expected: self.schema.fields.len(),
                found: row.values.len(),
            });
        }

        self.data.push(row);
        Ok(())
    }

    /// Get the number of rows in the dataset
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the dataset is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get the value at (`row`, `column`)
    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let index = self.schema.index_of(column)?;
        self.data.get(row).and_then(|r| r.get(index))
    }

    /// Get every value of a column, in row order
    pub fn column(&self, column: &str) -> Option<Vec<&Value>> {
        let index = self.schema.index_of(column)?;
        Some(self.data.iter().map(|row| &row.values[index]).collect())
    }
}

/// Represents a row in a dataset
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub values: Vec<Value>,
}

impl Row {
    /// Create a new row with the given values
    pub fn new(values: Vec<Value>) -> Self {
        Row { values }
    }

    /// Get a reference to a value by index
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Key used to detect exact-duplicate rows
    pub fn key(&self) -> Vec<ValueKey> {
        self.values.iter().map(Value::key).collect()
    }
}

/// Represents a value in a row
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    String(String),
    /// Always finite; non-finite parses degrade to `Null`
    Number(f64),
    Category(String),
    List(Vec<String>),
    Date(NaiveDate),
}

impl Value {
    /// Build a string value
    pub fn string<S: Into<String>>(s: S) -> Self {
        Value::String(s.into())
    }

    /// Build a category value
    pub fn category<S: Into<String>>(s: S) -> Self {
        Value::Category(s.into())
    }

    /// Build a number value, degrading non-finite input to `Null`
    pub fn number(n: f64) -> Self {
        if n.is_finite() {
            Value::Number(n)
        } else {
            Value::Null
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Null, a blank string, or an empty list
    pub fn is_missing(&self) -> bool {
        match self {
            Value::Null => true,
            Value::String(s) | Value::Category(s) => s.trim().is_empty(),
            Value::List(items) => items.is_empty(),
            Value::Number(_) | Value::Date(_) => false,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Textual content of string-like values
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) | Value::Category(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            Value::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Hashable identity of the value
    pub fn key(&self) -> ValueKey {
        match self {
            Value::Null => ValueKey::Null,
            Value::String(s) => ValueKey::String(s.clone()),
            // -0.0 and 0.0 compare equal, so they must hash equal
            Value::Number(n) => ValueKey::Number(if *n == 0.0 { 0 } else { n.to_bits() }),
            Value::Category(s) => ValueKey::Category(s.clone()),
            Value::List(items) => ValueKey::List(items.clone()),
            Value::Date(d) => ValueKey::Date(*d),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::String(s) | Value::Category(s) => write!(f, "{}", s),
            Value::Number(n) => write!(f, "{}", n),
            Value::List(items) => write!(f, "{}", items.join("|")),
            Value::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

/// Hashable, totally comparable projection of a [`Value`]
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ValueKey {
    Null,
    String(String),
    Number(u64),
    Category(String),
    List(Vec<String>),
    Date(NaiveDate),
}

/// Represents a schema for a dataset
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub fields: Vec<Field>,
}

impl Schema {
    /// Create a new schema with the given fields
    pub fn new(fields: Vec<Field>) -> Self {
        Schema { fields }
    }

    /// Get a reference to a field by name
    pub fn get_field_by_name(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Position of a column
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }
}

/// Represents a field in a schema
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub data_type: DataType,
    /// Computed from other columns rather than read from the source
    pub derived: bool,
}

impl Field {
    /// Create a new source field
    pub fn new<S: Into<String>>(name: S, data_type: DataType) -> Self {
        Field {
            name: name.into(),
            data_type,
            derived: false,
        }
    }

    /// Create a new derived field
    pub fn derived<S: Into<String>>(name: S, data_type: DataType) -> Self {
        Field {
            name: name.into(),
            data_type,
            derived: true,
        }
    }
}

/// Declared semantic type of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    String,
    Numeric,
    Categorical,
    CategoricalList,
    Date,
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            DataType::String => "string",
            DataType::Numeric => "numeric",
            DataType::Categorical => "categorical",
            DataType::CategoricalList => "categorical-list",
            DataType::Date => "date",
        };
        write!(f, "{}", name)
    }
}

/// Represents metadata for a dataset
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Metadata {
    pub properties: BTreeMap<String, String>,
}

impl Metadata {
    /// Create new empty metadata
    pub fn new() -> Self {
        Metadata::default()
    }

    /// Add a property to the metadata
    pub fn add<K: Into<String>, V: Into<String>>(&mut self, key: K, value: V) {
        self.properties.insert(key.into(), value.into());
    }

    /// Get a property from the metadata
    pub fn get(&self, key: &str) -> Option<&String> {
        self.properties.get(key)
    }
}

/// Represents an error in the data module
#[derive(Debug, Error)]
pub enum DataError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] ::csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Parse error: {0}")]
    Parse(String),
    #[error("Schema mismatch: expected {expected} values, found {found}")]
    SchemaMismatch { expected: usize, found: usize },
    #[error("Validation error: {0}")]
    Validation(String),
}
