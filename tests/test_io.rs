// Input/output and configuration tests
// Author: Gabriel Demetrios Lafis

use std::fs;

use chrono::NaiveDate;
use tempfile::tempdir;

use rust_data_cleaning_pipeline::{
    data::{
        CsvSink, CsvSource, DataError, DataSet, DataSink, DataSource, DataType, JsonSink, Row,
        SchemaBuilder, SchemaValidator, Value,
    },
    processing::DropReport,
    utils::{AppError, Config},
};

fn sample() -> DataSet {
    let schema = SchemaBuilder::new()
        .add_string("title")
        .add_numeric("rating")
        .add_categorical("genre")
        .add_date("rated_on")
        .build();

    let mut dataset = DataSet::new(schema);
    dataset
        .add_row(Row::new(vec![
            Value::string("Heat"),
            Value::Number(4.5),
            Value::category("Action"),
            Value::Date(NaiveDate::from_ymd_opt(2001, 6, 15).unwrap()),
        ]))
        .unwrap();
    dataset
        .add_row(Row::new(vec![
            Value::string("Casino, Vegas"),
            Value::Null,
            Value::category("Drama"),
            Value::Null,
        ]))
        .unwrap();
    dataset
}

#[test]
fn test_csv_na_tokens() {
    let raw = CsvSource::new("inline", true, ',')
        .read_from("a,b,c\nNA,n/a,x\n,NULL,-\n".as_bytes())
        .unwrap();

    assert_eq!(raw.len(), 2);
    assert_eq!(raw.value(0, "a"), Some(&Value::Null));
    assert_eq!(raw.value(0, "b"), Some(&Value::Null));
    assert_eq!(raw.value(0, "c"), Some(&Value::string("x")));
    assert_eq!(raw.value(1, "a"), Some(&Value::Null));
    assert_eq!(raw.value(1, "c"), Some(&Value::string("-")));
    assert_eq!(raw.metadata.get("source").map(String::as_str), Some("csv"));
}

#[test]
fn test_csv_extra_na_values() {
    let raw = CsvSource::new("inline", true, ';')
        .with_na_values(vec!["-", "?"])
        .read_from("a;b\n-;?\n1;2\n".as_bytes())
        .unwrap();

    assert_eq!(raw.value(0, "a"), Some(&Value::Null));
    assert_eq!(raw.value(0, "b"), Some(&Value::Null));
    assert_eq!(raw.value(1, "b"), Some(&Value::string("2")));
}

#[test]
fn test_csv_without_header() {
    let raw = CsvSource::new("inline", false, ',')
        .read_from("1,2,3\n4,5,6\n".as_bytes())
        .unwrap();

    assert_eq!(raw.schema.names(), vec!["column_0", "column_1", "column_2"]);
    assert_eq!(raw.len(), 2);
    assert!(raw.schema.fields.iter().all(|f| f.data_type == DataType::String));
}

#[test]
fn test_csv_file_roundtrip_through_sink() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("out.csv");

    CsvSink::new(&path, ',').write(&sample()).unwrap();
    let written = fs::read_to_string(&path).unwrap();

    assert_eq!(
        written,
        "title,rating,genre,rated_on\nHeat,4.5,Action,2001-06-15\n\"Casino, Vegas\",,Drama,\n"
    );

    let raw = CsvSource::new(&path, true, ',').read().unwrap();
    assert_eq!(raw.len(), 2);
    assert_eq!(raw.value(1, "title"), Some(&Value::string("Casino, Vegas")));
    assert_eq!(raw.value(1, "rating"), Some(&Value::Null));
}

#[test]
fn test_missing_csv_file() {
    let result = CsvSource::new("/no/such/file.csv", true, ',').read();
    assert!(result.is_err());
}

#[test]
fn test_json_sink() {
    let mut buffer = Vec::new();
    JsonSink::new("memory", false).write_to(&sample(), &mut buffer).unwrap();

    let json: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
    let records = json.as_array().unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["title"], "Heat");
    assert_eq!(records[0]["rating"], 4.5);
    assert_eq!(records[0]["rated_on"], "2001-06-15");
    assert!(records[1]["rating"].is_null());
}

#[test]
fn test_json_lists_are_arrays() {
    let value = JsonSink::value_to_json(&Value::List(vec!["a".to_string(), "b".to_string()]));
    assert_eq!(value, serde_json::json!(["a", "b"]));
}

#[test]
fn test_schema_validator() {
    let dataset = sample();
    assert!(SchemaValidator::validate_dataset(&dataset).is_ok());

    // A raw string in a numeric column is rejected
    let mut broken = dataset.clone();
    broken.data[0].values[1] = Value::string("4.5");
    assert!(SchemaValidator::validate_dataset(&broken).is_err());

    assert!(SchemaValidator::validate_value(&Value::category("x"), DataType::CategoricalList).is_ok());
    assert!(SchemaValidator::validate_value(&Value::Null, DataType::Date).is_ok());
}

#[test]
fn test_add_row_checks_width() {
    let mut dataset = sample();
    assert!(dataset.add_row(Row::new(vec![Value::Null])).is_err());
    assert_eq!(dataset.len(), 2);
}

#[test]
fn test_drop_report_json_and_text() {
    let mut report = DropReport::new(10);
    report.record_drops("outlier", 3);
    report.record_degraded("age");
    report.output_rows = 7;

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["drops"]["outlier"], 3);
    assert_eq!(json["drops"]["duplicate"], 0);
    assert_eq!(json["degraded_values"]["age"], 1);

    let text = report.to_string();
    assert!(text.contains("dropped (outlier): 3"));
    assert!(text.ends_with("output rows: 7"));
    assert!(report.reconciles());
}

#[test]
fn test_config_from_yaml() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    fs::write(&path, "input:\n  delimiter: ';'\n  na_values: ['-']\nlogging:\n  level: debug\n").unwrap();

    let config = Config::from_file(&path).unwrap();

    assert_eq!(config.input.delimiter, ';');
    assert!(config.input.has_header);
    assert_eq!(config.input.na_values, vec!["-"]);
    assert_eq!(config.output.format, "csv");
    assert_eq!(config.log_level_filter(), log::LevelFilter::Debug);
}

#[test]
fn test_config_from_json() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, r#"{"output": {"format": "json", "pretty": false}}"#).unwrap();

    let config = Config::from_file(&path).unwrap();

    assert_eq!(config.output.format, "json");
    assert!(!config.output.pretty);
    assert_eq!(config.input, Config::default().input);
    assert_eq!(config.log_level_filter(), log::LevelFilter::Info);
}

#[test]
fn test_config_unsupported_format() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.ini");
    fs::write(&path, "[input]").unwrap();

    let err = Config::from_file(&path).unwrap_err();
    assert!(matches!(err, AppError::Config(_)));
}

#[test]
fn test_non_ascii_delimiter_rejected() {
    let err = CsvSource::new("inline", true, '\u{2192}')
        .read_from("a\u{2192}b\n1\u{2192}2\n".as_bytes())
        .unwrap_err();
    assert!(matches!(err, DataError::Parse(_)));

    let mut buffer = Vec::new();
    let err = CsvSink::new("memory", '\u{e9}').write_to(&sample(), &mut buffer).unwrap_err();
    assert!(matches!(err, DataError::Parse(_)));
    assert!(buffer.is_empty());
}
