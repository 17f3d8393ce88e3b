// Per-column type coercion
// Author: Gabriel Demetrios Lafis

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::data::{DataSet, DataType, Row, Value};
use super::{median, require_column, CleaningStage, DropReport, ProcessingError, StageType, FAILED_COERCION};

/// Date layouts tried when a rule names none
pub const DEFAULT_DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%m/%d/%Y",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// How a column's raw text is turned into a typed value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum CoercionKind {
    /// Leave the value as read
    Text,
    Numeric,
    /// A bare number or a `low-high` range, with any trailing words ignored
    NumericRangeAverage,
    Categorical {
        #[serde(default)]
        case: Case,
    },
    /// Translate codes through a lookup table; unmapped codes become missing
    CategoryMap { mapping: BTreeMap<String, String> },
    SplitExplode {
        #[serde(default = "default_list_delimiter")]
        delimiter: String,
    },
    Date {
        #[serde(default = "default_date_formats")]
        formats: Vec<String>,
    },
}

fn default_list_delimiter() -> String {
    "|".to_string()
}

fn default_date_formats() -> Vec<String> {
    DEFAULT_DATE_FORMATS.iter().map(|f| f.to_string()).collect()
}

impl Default for CoercionKind {
    fn default() -> Self {
        CoercionKind::Text
    }
}

/// Letter case applied to categorical labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Case {
    Upper,
    Lower,
    Title,
    Preserve,
}

impl Default for Case {
    fn default() -> Self {
        Case::Upper
    }
}

/// Imputation for missing values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "kebab-case")]
pub enum FillStrategy {
    /// Substitute raw text before coercion
    Constant { value: String },
    /// Substitute the median of the coerced column
    Median,
}

impl CoercionKind {
    /// Declared type of a column after coercion
    pub fn data_type(&self) -> DataType {
        match self {
            CoercionKind::Text => DataType::String,
            CoercionKind::Numeric | CoercionKind::NumericRangeAverage => DataType::Numeric,
            CoercionKind::Categorical { .. } | CoercionKind::CategoryMap { .. } => DataType::Categorical,
            CoercionKind::SplitExplode { .. } => DataType::CategoricalList,
            CoercionKind::Date { .. } => DataType::Date,
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.data_type() == DataType::Numeric
    }

    /// Coerce a single value; failures degrade to `Null`
    pub fn coerce(&self, value: &Value) -> Value {
        if value.is_null() {
            return Value::Null;
        }

        let coerced = match self {
            CoercionKind::Text => Some(value.clone()),
            CoercionKind::Numeric => match value {
                Value::Number(n) => Some(Value::Number(*n)),
                _ => value.as_str().and_then(parse_number).map(Value::Number),
            },
            CoercionKind::NumericRangeAverage => match value {
                Value::Number(n) => Some(Value::Number(*n)),
                _ => value.as_str().and_then(range_average).map(Value::Number),
            },
            CoercionKind::Categorical { case } => label_text(value)
                .and_then(|text| normalize_category(&text, *case))
                .map(Value::Category),
            CoercionKind::CategoryMap { mapping } => label_text(value)
                .and_then(|text| mapping.get(text.trim()).cloned())
                .map(Value::Category),
            CoercionKind::SplitExplode { delimiter } => match value {
                Value::List(items) => Some(Value::List(items.clone())),
                _ => value
                    .as_str()
                    .map(|text| split_list(text, delimiter))
                    .filter(|items| !items.is_empty())
                    .map(Value::List),
            },
            CoercionKind::Date { formats } => match value {
                Value::Date(d) => Some(Value::Date(*d)),
                _ => value
                    .as_str()
                    .and_then(|text| parse_date(text, formats))
                    .map(Value::Date),
            },
        };

        coerced.unwrap_or(Value::Null)
    }
}

/// Text of a value that can act as a label (numbers are formatted)
fn label_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) | Value::Category(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Parse a finite floating-point number, ignoring surrounding whitespace
pub fn parse_number(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    text.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Average a free-text value such as `"3-5 years"` or `"7"`
///
/// Anything after the last digit is discarded. What remains must be a number
/// or two numbers joined by a hyphen or en dash.
pub fn range_average(text: &str) -> Option<f64> {
    let text = text.trim();
    let end = text.rfind(|c: char| c.is_ascii_digit())? + 1;
    let body = text[..end].trim();

    if let Some(n) = parse_number(body) {
        return Some(n);
    }

    // Skip the first character so a leading minus sign is not a separator
    let (split, separator) = body
        .char_indices()
        .skip(1)
        .find(|(_, c)| *c == '-' || *c == '\u{2013}')?;
    let low = parse_number(&body[..split])?;
    let high = parse_number(&body[split + separator.len_utf8()..])?;

    Some((low + high) / 2.0)
}

/// Trim a label and apply `case`; blank labels are missing
pub fn normalize_category(text: &str, case: Case) -> Option<String> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    Some(match case {
        Case::Upper => text.to_uppercase(),
        Case::Lower => text.to_lowercase(),
        Case::Title => title_case(text),
        Case::Preserve => text.to_string(),
    })
}

/// Uppercase the first letter of every run of letters, lowercase the rest
pub fn title_case(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut in_word = false;

    for c in text.chars() {
        if c.is_alphabetic() {
            if in_word {
                result.extend(c.to_lowercase());
            } else {
                result.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            result.push(c);
            in_word = false;
        }
    }

    result
}

/// Split a delimiter-joined field into trimmed, non-empty items
pub fn split_list(text: &str, delimiter: &str) -> Vec<String> {
    if delimiter.is_empty() {
        let text = text.trim();
        return if text.is_empty() { Vec::new() } else { vec![text.to_string()] };
    }

    text.split(delimiter)
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse a calendar date
///
/// All-digit input is read as Unix seconds. Otherwise each format is tried as
/// a date, then as a date-time, before falling back to RFC 3339.
pub fn parse_date<S: AsRef<str>>(text: &str, formats: &[S]) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if text.bytes().all(|b| b.is_ascii_digit()) {
        let seconds = text.parse::<i64>().ok()?;
        return DateTime::<Utc>::from_timestamp(seconds, 0).map(|dt| dt.date_naive());
    }

    for format in formats {
        let format = format.as_ref();
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Some(date);
        }
        if let Ok(datetime) = NaiveDateTime::parse_from_str(text, format) {
            return Some(datetime.date());
        }
    }

    DateTime::parse_from_rfc3339(text).ok().map(|dt| dt.date_naive())
}

/// Coercion plan for one column
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnCoercion {
    pub column: String,
    pub kind: CoercionKind,
    /// Drop the row if this column ends up missing
    pub required: bool,
    pub fill: Option<FillStrategy>,
}

impl ColumnCoercion {
    pub fn new(column: &str, kind: CoercionKind) -> Self {
        ColumnCoercion {
            column: column.to_string(),
            kind,
            required: false,
            fill: None,
        }
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn fill(mut self, fill: FillStrategy) -> Self {
        self.fill = Some(fill);
        self
    }
}

/// Coerce columns to their declared kinds, impute, and drop rows whose
/// required values did not survive coercion
pub struct CoerceTransform {
    columns: Vec<ColumnCoercion>,
}

impl CoerceTransform {
    pub fn new(columns: Vec<ColumnCoercion>) -> Self {
        CoerceTransform { columns }
    }
}

impl CleaningStage for CoerceTransform {
    fn apply(&self, input: &DataSet, report: &mut DropReport) -> Result<DataSet, ProcessingError> {
        let plan = self
            .columns
            .iter()
            .map(|c| require_column(&input.schema, &c.column, "a field rule").map(|index| (index, c)))
            .collect::<Result<Vec<_>, _>>()?;

        let mut schema = input.schema.clone();
        for (index, coercion) in &plan {
            schema.fields[*index].data_type = coercion.kind.data_type();
        }

        let mut result = DataSet::derived_from(schema, input);
        let mut failed = 0;

        for row in &input.data {
            let mut values = row.values.clone();
            let mut keep = true;

            for (index, coercion) in &plan {
                let raw = match &coercion.fill {
                    Some(FillStrategy::Constant { value }) if values[*index].is_missing() => {
                        Value::String(value.clone())
                    }
                    _ => values[*index].clone(),
                };

                let coerced = coercion.kind.coerce(&raw);
                if coerced.is_null() && !raw.is_missing() {
                    trace!("'{}': could not coerce {:?}", coercion.column, raw);
                    report.record_degraded(&coercion.column);
                }
                if coercion.required && coerced.is_missing() {
                    keep = false;
                }
                values[*index] = coerced;
            }

            if keep {
                result.add_row(Row::new(values))?;
            } else {
                failed += 1;
            }
        }

        // Medians are taken over the rows that survived coercion
        for (index, coercion) in &plan {
            if coercion.fill != Some(FillStrategy::Median) {
                continue;
            }

            let mut present: Vec<f64> = result
                .data
                .iter()
                .filter_map(|row| row.values[*index].as_number())
                .collect();

            if let Some(m) = median(&mut present) {
                debug!("'{}': filling missing values with median {}", coercion.column, m);
                for row in &mut result.data {
                    if row.values[*index].is_null() {
                        row.values[*index] = Value::Number(m);
                    }
                }
            }
        }

        report.record_drops(FAILED_COERCION, failed);
        Ok(result)
    }

    fn name(&self) -> &str {
        "coerce"
    }

    fn stage_type(&self) -> StageType {
        StageType::Coerce
    }
}
