// Built-in rule tables for the course datasets
// Author: Gabriel Demetrios Lafis

use std::collections::BTreeMap;

use crate::processing::{BucketRule, Case, CoercionKind, FillStrategy, Formula, RangePredicate, DEFAULT_DATE_FORMATS};
use super::{CleaningRules, FieldRule};

/// Names accepted by [`preset`]
pub const PRESET_NAMES: &[&str] = &["salary", "movies", "food"];

/// Look up a built-in rule table
pub fn preset(name: &str) -> Option<CleaningRules> {
    match name {
        "salary" => Some(salary_rules()),
        "movies" => Some(movie_ratings_rules()),
        "food" => Some(food_rules()),
        _ => None,
    }
}

fn date() -> FieldRule {
    FieldRule::new(CoercionKind::Date {
        formats: DEFAULT_DATE_FORMATS.iter().map(|f| f.to_string()).collect(),
    })
}

fn categorical(case: Case) -> FieldRule {
    FieldRule::new(CoercionKind::Categorical { case })
}

/// Salary survey: long question headers replaced by position
pub fn salary_rules() -> CleaningRules {
    CleaningRules::new("salary")
        .columns(&[
            "timestamp",
            "age",
            "industry",
            "title",
            "title_context",
            "salary",
            "additional_compensation",
            "currency",
            "other_currency",
            "salary_context",
            "country",
            "state",
            "city",
            "total_yoe",
            "field_yoe",
            "highest_education_completed",
            "gender",
            "race",
        ])
        .field("timestamp", date())
        .field("salary", FieldRule::numeric().required())
        .field("industry", FieldRule::text().required())
        .field("title", FieldRule::text().required())
        .field("additional_compensation", FieldRule::numeric())
        .field("age", FieldRule::numeric())
        .field("total_yoe", FieldRule::new(CoercionKind::NumericRangeAverage))
        .field("field_yoe", FieldRule::new(CoercionKind::NumericRangeAverage))
        .drop_duplicates(false)
}

/// MovieLens ratings joined with user demographics and movie genres
pub fn movie_ratings_rules() -> CleaningRules {
    CleaningRules::new("movies")
        .field("rating", FieldRule::numeric().required())
        .field("year", FieldRule::numeric().required())
        .field("age", FieldRule::numeric().fill(FillStrategy::Median))
        .field(
            "occupation",
            categorical(Case::Title).fill(FillStrategy::Constant {
                value: "Unknown".to_string(),
            }),
        )
        .field("gender", categorical(Case::Upper))
        .field(
            "genres",
            FieldRule::new(CoercionKind::SplitExplode {
                delimiter: "|".to_string(),
            }),
        )
        .field("timestamp", date())
        .derive(
            "rating_year",
            Formula::Year {
                column: "timestamp".to_string(),
            },
        )
        .derive(
            "movie_age",
            Formula::Difference {
                left: "rating_year".to_string(),
                right: "year".to_string(),
            },
        )
        .derive(
            "decade",
            Formula::FloorBucket {
                column: "year".to_string(),
                width: 10.0,
            },
        )
        .bucket(BucketRule::new(
            "age",
            "age_group",
            vec![10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0],
            vec!["10s", "20s", "30s", "40s", "50s", "60s", "70s"],
        ))
        .range(RangePredicate::new("age", 10.0, 100.0))
        .range(RangePredicate::new("rating", 0.5, 5.0))
}

/// Food and fitness survey, gender coded 1/2
pub fn food_rules() -> CleaningRules {
    let mut genders = BTreeMap::new();
    genders.insert("1".to_string(), "Male".to_string());
    genders.insert("2".to_string(), "Female".to_string());

    CleaningRules::new("food")
        .field("calories_day", FieldRule::numeric().required())
        .field("weight", FieldRule::numeric().required())
        .field(
            "gender",
            FieldRule::new(CoercionKind::CategoryMap { mapping: genders }).required(),
        )
        .derive(
            "calories_per_kg",
            Formula::Ratio {
                numerator: "calories_day".to_string(),
                denominator: "weight".to_string(),
            },
        )
        .drop_duplicates(false)
}
