// JSON data sink implementation
// Author: Gabriel Demetrios Lafis

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde_json::{Map, Value as JsonValue};

use super::{DataError, DataSet, DataSink, Value};

/// JSON data sink, writing the dataset as an array of records
pub struct JsonSink {
    path: String,
    pretty: bool,
}

impl JsonSink {
    /// Create a new JSON data sink
    pub fn new<P: AsRef<Path>>(path: P, pretty: bool) -> Self {
        JsonSink {
            path: path.as_ref().to_string_lossy().to_string(),
            pretty,
        }
    }

    /// Convert a data value to a JSON value
    pub fn value_to_json(value: &Value) -> JsonValue {
        match value {
            Value::Null => JsonValue::Null,
            Value::String(s) | Value::Category(s) => JsonValue::String(s.clone()),
            Value::Number(n) => serde_json::Number::from_f64(*n)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            Value::List(items) => {
                JsonValue::Array(items.iter().cloned().map(JsonValue::String).collect())
            }
            Value::Date(d) => JsonValue::String(d.format("%Y-%m-%d").to_string()),
        }
    }

    /// Convert a dataset to a JSON array of objects
    pub fn dataset_to_json(data: &DataSet) -> JsonValue {
        let records = data
            .data
            .iter()
            .map(|row| {
                let mut object = Map::new();
                for (field, value) in data.schema.fields.iter().zip(&row.values) {
                    object.insert(field.name.clone(), Self::value_to_json(value));
                }
                JsonValue::Object(object)
            })
            .collect();

        JsonValue::Array(records)
    }

    /// Write a dataset to any writer
    pub fn write_to<W: Write>(&self, data: &DataSet, mut writer: W) -> Result<(), DataError> {
        let json = Self::dataset_to_json(data);

        if self.pretty {
            serde_json::to_writer_pretty(&mut writer, &json)?;
        } else {
            serde_json::to_writer(&mut writer, &json)?;
        }

        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }
}

impl DataSink for JsonSink {
    fn write(&self, data: &DataSet) -> Result<(), DataError> {
        let file = File::create(&self.path)?;
        self.write_to(data, BufWriter::new(file))
    }

    fn name(&self) -> &str {
        &self.path
    }
}
