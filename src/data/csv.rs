// CSV data source and sink implementation
// Author: Gabriel Demetrios Lafis

use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use log::debug;

use super::{DataError, DataSet, DataSink, DataSource, Row, SchemaBuilder, Value};

/// Tokens read as missing, matching the defaults of common dataframe readers
pub const DEFAULT_NA_VALUES: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND",
    "1.#QNAN", "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// The csv crate splits on a single byte, so only ASCII delimiters are usable
fn delimiter_byte(delimiter: char) -> Result<u8, DataError> {
    if delimiter.is_ascii() {
        Ok(delimiter as u8)
    } else {
        Err(DataError::Parse(format!(
            "delimiter '{}' is not a single ASCII character",
            delimiter
        )))
    }
}

/// CSV data source
///
/// Every cell is read as a raw [`Value::String`]; cells matching one of the
/// NA tokens become [`Value::Null`]. Typing is left to the cleaning pipeline.
pub struct CsvSource {
    path: String,
    has_header: bool,
    delimiter: char,
    na_values: BTreeSet<String>,
}

impl CsvSource {
    /// Create a new CSV data source
    pub fn new<P: AsRef<Path>>(path: P, has_header: bool, delimiter: char) -> Self {
        CsvSource {
            path: path.as_ref().to_string_lossy().to_string(),
            has_header,
            delimiter,
            na_values: DEFAULT_NA_VALUES.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Add extra tokens to treat as missing
    pub fn with_na_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.na_values.extend(values.into_iter().map(Into::into));
        self
    }

    /// Read a dataset from any reader
    pub fn read_from<R: Read>(&self, reader: R) -> Result<DataSet, DataError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(delimiter_byte(self.delimiter)?)
            .has_headers(self.has_header)
            .from_reader(reader);

        let headers: Option<Vec<String>> = if self.has_header {
            Some(csv_reader.headers()?.iter().map(|s| s.to_string()).collect())
        } else {
            None
        };

        let mut records = Vec::new();
        for result in csv_reader.records() {
            records.push(result?);
        }

        // Generate column names if no header
        let headers = match headers {
            Some(headers) => headers,
            None => {
                let width = records
                    .first()
                    .map(|record| record.len())
                    .ok_or_else(|| DataError::Parse("Empty CSV input".to_string()))?;
                (0..width).map(|i| format!("column_{}", i)).collect()
            }
        };

        let schema = SchemaBuilder::new().add_strings(&headers).build();
        let mut dataset = DataSet::new(schema);

        for record in &records {
            let values: Vec<Value> = record
                .iter()
                .map(|field| {
                    if self.na_values.contains(field) {
                        Value::Null
                    } else {
                        Value::String(field.to_string())
                    }
                })
                .collect();

            dataset.add_row(Row::new(values))?;
        }

        dataset.metadata.add("source", "csv");
        dataset.metadata.add("path", self.path.clone());
        debug!("Read {} rows x {} columns from {}", dataset.len(), headers.len(), self.path);

        Ok(dataset)
    }
}

impl DataSource for CsvSource {
    fn read(&self) -> Result<DataSet, DataError> {
        let file = File::open(&self.path)?;
        self.read_from(BufReader::new(file))
    }

    fn name(&self) -> &str {
        &self.path
    }
}

/// CSV data sink
pub struct CsvSink {
    path: String,
    delimiter: char,
}

impl CsvSink {
    /// Create a new CSV data sink
    pub fn new<P: AsRef<Path>>(path: P, delimiter: char) -> Self {
        CsvSink {
            path: path.as_ref().to_string_lossy().to_string(),
            delimiter,
        }
    }

    /// Write a dataset to any writer
    pub fn write_to<W: Write>(&self, data: &DataSet, writer: W) -> Result<(), DataError> {
        let mut csv_writer = csv::WriterBuilder::new()
            .delimiter(delimiter_byte(self.delimiter)?)
            .from_writer(writer);

        csv_writer.write_record(data.schema.names())?;

        for row in &data.data {
            let record: Vec<String> = row.values.iter().map(|value| value.to_string()).collect();
            csv_writer.write_record(&record)?;
        }

        csv_writer.flush()?;
        Ok(())
    }
}

impl DataSink for CsvSink {
    fn write(&self, data: &DataSet) -> Result<(), DataError> {
        let file = File::create(&self.path)?;
        self.write_to(data, BufWriter::new(file))
    }

    fn name(&self) -> &str {
        &self.path
    }
}
