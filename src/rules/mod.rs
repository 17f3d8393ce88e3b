// Declarative cleaning rules
// Author: Gabriel Demetrios Lafis

mod presets;

pub use presets::*;

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::data::DataSet;
use crate::processing::{
    normalize_column_name, BucketRule, BucketTransform, CoerceTransform, CoercionKind,
    ColumnCoercion, DerivedColumn, DerivedColumnTransform, DropReport, DuplicateFilter,
    ExplodeTransform, FillStrategy, Formula, NormalizeColumnsTransform, Pipeline,
    ProcessingError, RangeFilter, RangePredicate, RequiredFilter, SchemaError,
};
use crate::utils::{
    load_structured, validate_bins, validate_not_empty, validate_positive, validate_range,
    AppResult,
};

/// How one source column is cleaned
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldRule {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rename: Option<String>,
    #[serde(default)]
    pub kind: CoercionKind,
    /// Rows missing this value, before or after coercion, are dropped
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<FillStrategy>,
}

impl FieldRule {
    pub fn new(kind: CoercionKind) -> Self {
        FieldRule {
            kind,
            ..FieldRule::default()
        }
    }

    pub fn text() -> Self {
        Self::new(CoercionKind::Text)
    }

    pub fn numeric() -> Self {
        Self::new(CoercionKind::Numeric)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn rename(mut self, target: &str) -> Self {
        self.rename = Some(target.to_string());
        self
    }

    pub fn fill(mut self, fill: FillStrategy) -> Self {
        self.fill = Some(fill);
        self
    }
}

/// The full rule table for one dataset
///
/// `fields` are keyed by source column name (normalized before lookup); the
/// derived, bucket and range rules refer to columns by their final name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleaningRules {
    pub name: String,
    #[serde(default = "default_separator")]
    pub separator: char,
    /// Replacement header, by position
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<String>>,
    #[serde(default)]
    pub fields: BTreeMap<String, FieldRule>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub derived: Vec<DerivedColumn>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub buckets: Vec<BucketRule>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ranges: Vec<RangePredicate>,
    #[serde(default = "default_true")]
    pub drop_duplicates: bool,
}

fn default_separator() -> char {
    '_'
}

fn default_true() -> bool {
    true
}

impl CleaningRules {
    pub fn new(name: &str) -> Self {
        CleaningRules {
            name: name.to_string(),
            separator: default_separator(),
            columns: None,
            fields: BTreeMap::new(),
            derived: Vec::new(),
            buckets: Vec::new(),
            ranges: Vec::new(),
            drop_duplicates: true,
        }
    }

    pub fn columns(mut self, names: &[&str]) -> Self {
        self.columns = Some(names.iter().map(|name| name.to_string()).collect());
        self
    }

    pub fn field(mut self, column: &str, rule: FieldRule) -> Self {
        self.fields.insert(column.to_string(), rule);
        self
    }

    pub fn derive(mut self, name: &str, formula: Formula) -> Self {
        self.derived.push(DerivedColumn::new(name, formula));
        self
    }

    pub fn bucket(mut self, rule: BucketRule) -> Self {
        self.buckets.push(rule);
        self
    }

    pub fn range(mut self, predicate: RangePredicate) -> Self {
        self.ranges.push(predicate);
        self
    }

    pub fn drop_duplicates(mut self, drop: bool) -> Self {
        self.drop_duplicates = drop;
        self
    }

    /// Load rules from a JSON or YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        let rules: CleaningRules = load_structured(path)?;
        rules.validate()?;
        Ok(rules)
    }

    /// A built-in preset by name, or else a rules file at that path
    pub fn load(preset_or_path: &str) -> AppResult<Self> {
        match preset(preset_or_path) {
            Some(rules) => Ok(rules),
            None => Self::from_file(preset_or_path),
        }
    }

    /// Check the table for contradictions that no dataset could satisfy
    pub fn validate(&self) -> Result<(), ProcessingError> {
        let invalid = |msg: String| ProcessingError::InvalidRule(format!("{}: {}", self.name, msg));

        for (column, rule) in &self.fields {
            if let Some(target) = &rule.rename {
                validate_not_empty(target, &format!("{}.rename", column)).map_err(invalid)?;
            }

            match &rule.kind {
                CoercionKind::SplitExplode { delimiter } => {
                    validate_not_empty(delimiter, &format!("{}.delimiter", column)).map_err(invalid)?;
                }
                CoercionKind::Date { formats } if formats.is_empty() => {
                    return Err(invalid(format!("'{}' declares no date formats", column)));
                }
                _ => {}
            }

            if rule.fill == Some(FillStrategy::Median) && !rule.kind.is_numeric() {
                return Err(invalid(format!("median fill on non-numeric column '{}'", column)));
            }
        }

        for derived in &self.derived {
            validate_not_empty(&derived.name, "derived column name").map_err(invalid)?;
            if let Formula::FloorBucket { width, .. } = &derived.formula {
                validate_positive(*width, &format!("{}.width", derived.name)).map_err(invalid)?;
            }
        }

        for bucket in &self.buckets {
            validate_bins(&bucket.edges, &bucket.labels)
                .map_err(|msg| invalid(format!("bucket '{}': {}", bucket.target, msg)))?;
        }

        for predicate in &self.ranges {
            validate_range(predicate.min, predicate.max, &predicate.column).map_err(invalid)?;
        }

        Ok(())
    }

    /// Field rules keyed by normalized source name, with their final name
    fn normalized_fields(&self) -> Result<Vec<(String, String, &FieldRule)>, SchemaError> {
        let mut fields: Vec<(String, String, &FieldRule)> = Vec::with_capacity(self.fields.len());

        for (column, rule) in &self.fields {
            let source = normalize_column_name(column, self.separator);
            if fields.iter().any(|(existing, _, _)| *existing == source) {
                return Err(SchemaError::Collision { column: source });
            }
            let target = rule.rename.clone().unwrap_or_else(|| source.clone());
            fields.push((source, target, rule));
        }

        Ok(fields)
    }

    /// Build the stage sequence these rules describe
    pub fn build_pipeline(&self) -> Result<Pipeline, ProcessingError> {
        self.validate()?;
        let fields = self.normalized_fields()?;

        let renames: BTreeMap<String, String> = fields
            .iter()
            .filter(|(_, _, rule)| rule.rename.is_some())
            .map(|(source, target, _)| (source.clone(), target.clone()))
            .collect();
        let expected = fields.iter().map(|(source, _, _)| source.clone()).collect();

        let mut normalize = NormalizeColumnsTransform::new(self.separator)
            .with_renames(renames)
            .with_expected(expected);
        if let Some(columns) = &self.columns {
            normalize = normalize.with_positional(columns.clone());
        }

        let required = fields
            .iter()
            .filter(|(_, _, rule)| rule.required)
            .map(|(_, target, _)| target.clone())
            .collect();

        let coercions = fields
            .iter()
            .map(|(_, target, rule)| {
                let coercion = ColumnCoercion::new(target, rule.kind.clone()).required(rule.required);
                match &rule.fill {
                    Some(fill) => coercion.fill(fill.clone()),
                    None => coercion,
                }
            })
            .collect();

        let explode: Vec<String> = fields
            .iter()
            .filter(|(_, _, rule)| matches!(rule.kind, CoercionKind::SplitExplode { .. }))
            .map(|(_, target, _)| target.clone())
            .collect();

        let mut pipeline = Pipeline::new(&self.name)
            .add(normalize)
            .add(RequiredFilter::new(required))
            .add(CoerceTransform::new(coercions));
        if !explode.is_empty() {
            pipeline = pipeline.add(ExplodeTransform::new(explode));
        }

        let pipeline = pipeline
            .add(DerivedColumnTransform::new(self.derived.clone()))
            .add(BucketTransform::new(self.buckets.clone()))
            .add(RangeFilter::new(self.ranges.clone()));

        Ok(if self.drop_duplicates {
            pipeline.add(DuplicateFilter)
        } else {
            pipeline
        })
    }

    /// Clean a raw dataset with these rules
    pub fn clean(&self, raw: &DataSet) -> Result<(DataSet, DropReport), ProcessingError> {
        self.build_pipeline()?.execute(raw)
    }
}

/// Clean a raw dataset with a rule table
pub fn clean(raw: &DataSet, rules: &CleaningRules) -> Result<(DataSet, DropReport), ProcessingError> {
    rules.clean(raw)
}
