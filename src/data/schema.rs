// Schema definition and validation
// Author: Gabriel Demetrios Lafis

use super::{DataError, DataSet, DataType, Field, Row, Schema, Value};

/// Schema validator for ensuring data conforms to a schema
pub struct SchemaValidator;

impl SchemaValidator {
    /// Validate a value against a data type
    pub fn validate_value(value: &Value, data_type: DataType) -> Result<(), DataError> {
        match (value, data_type) {
            (Value::Null, _) => Ok(()), // Null is valid for any type
            (Value::String(_), DataType::String) => Ok(()),
            (Value::Number(n), DataType::Numeric) if n.is_finite() => Ok(()),
            (Value::Category(_), DataType::Categorical) => Ok(()),
            // A list column holds lists until exploded, then single labels
            (Value::List(_), DataType::CategoricalList) => Ok(()),
            (Value::Category(_), DataType::CategoricalList) => Ok(()),
            (Value::Date(_), DataType::Date) => Ok(()),
            _ => Err(DataError::Validation(format!(
                "Value {:?} does not match declared type {}",
                value, data_type
            ))),
        }
    }

    /// Validate a row against a schema
    pub fn validate_row(row: &Row, schema: &Schema) -> Result<(), DataError> {
        if row.values.len() != schema.fields.len() {
            return Err(DataError::SchemaMismatch {
                expected: schema.fields.len(),
                found: row.values.len(),
            });
        }

        for (field, value) in schema.fields.iter().zip(&row.values) {
            Self::validate_value(value, field.data_type).map_err(|err| {
                DataError::Validation(format!("Field '{}': {}", field.name, err))
            })?;
        }

        Ok(())
    }

    /// Validate every row of a dataset
    pub fn validate_dataset(dataset: &DataSet) -> Result<(), DataError> {
        for (index, row) in dataset.data.iter().enumerate() {
            Self::validate_row(row, &dataset.schema).map_err(|err| {
                DataError::Validation(format!("Row {}: {}", index, err))
            })?;
        }

        Ok(())
    }
}

/// Schema builder for creating schemas
pub struct SchemaBuilder {
    fields: Vec<Field>,
}

impl SchemaBuilder {
    /// Create a new schema builder
    pub fn new() -> Self {
        SchemaBuilder { fields: Vec::new() }
    }

    /// Add a field to the schema
    pub fn add_field(mut self, name: &str, data_type: DataType) -> Self {
        self.fields.push(Field::new(name, data_type));
        self
    }

    pub fn add_string(self, name: &str) -> Self {
        self.add_field(name, DataType::String)
    }

    pub fn add_numeric(self, name: &str) -> Self {
        self.add_field(name, DataType::Numeric)
    }

    pub fn add_categorical(self, name: &str) -> Self {
        self.add_field(name, DataType::Categorical)
    }

    pub fn add_date(self, name: &str) -> Self {
        self.add_field(name, DataType::Date)
    }

    /// Add one string field per name, the shape of a freshly read CSV
    pub fn add_strings<S: AsRef<str>>(self, names: &[S]) -> Self {
        names
            .iter()
            .fold(self, |builder, name| builder.add_string(name.as_ref()))
    }

    /// Build the schema
    pub fn build(self) -> Schema {
        Schema::new(self.fields)
    }
}

impl Default for SchemaBuilder {
    fn default() -> Self {
        Self::new()
    }
}
