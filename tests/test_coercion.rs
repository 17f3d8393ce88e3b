// Coercion tests
// Author: Gabriel Demetrios Lafis

use std::collections::BTreeMap;

use chrono::NaiveDate;

use rust_data_cleaning_pipeline::{
    data::{DataType, Value},
    processing::{
        mean, median, parse_date, parse_number, range_average, split_list, title_case, Case,
        CoercionKind, DEFAULT_DATE_FORMATS,
    },
};

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

#[test]
fn test_parse_number() {
    assert_eq!(parse_number(" 42 "), Some(42.0));
    assert_eq!(parse_number("-3.5"), Some(-3.5));
    assert_eq!(parse_number(""), None);
    assert_eq!(parse_number("abc"), None);

    // Non-finite parses are rejected
    assert_eq!(parse_number("nan"), None);
    assert_eq!(parse_number("inf"), None);
}

#[test]
fn test_range_average() {
    assert_eq!(range_average("3-5 years"), Some(4.0));
    assert_eq!(range_average("n/a"), None);
    assert_eq!(range_average("5-7 years"), Some(6.0));
    assert_eq!(range_average("2 - 4 years"), Some(3.0));
    assert_eq!(range_average("21 - 30 years"), Some(25.5));
    assert_eq!(range_average("5\u{2013}7"), Some(6.0));
    assert_eq!(range_average("41 years or more"), Some(41.0));
    assert_eq!(range_average("7"), Some(7.0));
    assert_eq!(range_average("-3"), Some(-3.0));
    assert_eq!(range_average("less than a year"), None);
    assert_eq!(range_average(""), None);
}

#[test]
fn test_title_case() {
    assert_eq!(title_case("k-12 STUDENT"), "K-12 Student");
    assert_eq!(title_case("o'brien"), "O'Brien");
    assert_eq!(title_case("technician"), "Technician");
}

#[test]
fn test_split_list() {
    assert_eq!(split_list(" Drama | | Comedy ", "|"), vec!["Drama", "Comedy"]);
    assert_eq!(split_list("Drama", "|"), vec!["Drama"]);
    assert!(split_list(" | ", "|").is_empty());
}

#[test]
fn test_parse_date_formats() {
    assert_eq!(parse_date("2021-04-27", DEFAULT_DATE_FORMATS), Some(ymd(2021, 4, 27)));
    assert_eq!(
        parse_date("4/27/2021 11:02:10", DEFAULT_DATE_FORMATS),
        Some(ymd(2021, 4, 27))
    );
    assert_eq!(
        parse_date("2021-04-27T08:00:00+02:00", DEFAULT_DATE_FORMATS),
        Some(ymd(2021, 4, 27))
    );
    assert_eq!(parse_date("yesterday", DEFAULT_DATE_FORMATS), None);
}

#[test]
fn test_parse_date_unix_seconds() {
    // MovieLens stores rating times as seconds since the epoch
    assert_eq!(parse_date("881250949", DEFAULT_DATE_FORMATS), Some(ymd(1997, 12, 4)));
}

#[test]
fn test_numeric_coercion() {
    let kind = CoercionKind::Numeric;

    assert_eq!(kind.coerce(&Value::string("3.5")), Value::Number(3.5));
    assert_eq!(kind.coerce(&Value::string("abc")), Value::Null);
    assert_eq!(kind.coerce(&Value::Null), Value::Null);
    // Already numeric
    assert_eq!(kind.coerce(&Value::Number(2.0)), Value::Number(2.0));
    assert_eq!(kind.data_type(), DataType::Numeric);
}

#[test]
fn test_categorical_coercion() {
    let upper = CoercionKind::Categorical { case: Case::Upper };
    assert_eq!(upper.coerce(&Value::string(" f ")), Value::category("F"));
    assert_eq!(upper.coerce(&Value::string("   ")), Value::Null);

    let title = CoercionKind::Categorical { case: Case::Title };
    assert_eq!(title.coerce(&Value::string("college STUDENT")), Value::category("College Student"));
    assert_eq!(title.data_type(), DataType::Categorical);
}

#[test]
fn test_category_map_coercion() {
    let mut mapping = BTreeMap::new();
    mapping.insert("1".to_string(), "Male".to_string());
    mapping.insert("2".to_string(), "Female".to_string());
    let kind = CoercionKind::CategoryMap { mapping };

    assert_eq!(kind.coerce(&Value::string("1")), Value::category("Male"));
    assert_eq!(kind.coerce(&Value::string(" 2 ")), Value::category("Female"));
    assert_eq!(kind.coerce(&Value::Number(2.0)), Value::category("Female"));
    assert_eq!(kind.coerce(&Value::string("9")), Value::Null);
}

#[test]
fn test_split_and_date_coercion() {
    let split = CoercionKind::SplitExplode {
        delimiter: "|".to_string(),
    };
    assert_eq!(
        split.coerce(&Value::string("Drama|Comedy")),
        Value::List(vec!["Drama".to_string(), "Comedy".to_string()])
    );
    assert_eq!(split.data_type(), DataType::CategoricalList);

    let date = CoercionKind::Date {
        formats: vec!["%d.%m.%Y".to_string()],
    };
    assert_eq!(date.coerce(&Value::string("27.04.2021")), Value::Date(ymd(2021, 4, 27)));
    assert_eq!(date.coerce(&Value::Date(ymd(2020, 1, 1))), Value::Date(ymd(2020, 1, 1)));
    assert_eq!(date.coerce(&Value::string("2021/04/27")), Value::Null);
}

#[test]
fn test_text_coercion_keeps_value() {
    let kind = CoercionKind::default();

    assert_eq!(kind, CoercionKind::Text);
    assert_eq!(kind.coerce(&Value::string(" as is ")), Value::string(" as is "));
}

#[test]
fn test_stats() {
    assert_eq!(mean(&[1.0, 2.0, 6.0]), Some(3.0));
    assert_eq!(mean(&[]), None);

    assert_eq!(median(&mut [3.0, 1.0, 2.0]), Some(2.0));
    assert_eq!(median(&mut [4.0, 1.0, 3.0, 2.0]), Some(2.5));
    assert_eq!(median(&mut []), None);
}
