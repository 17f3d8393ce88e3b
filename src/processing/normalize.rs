// Column name normalization
// Author: Gabriel Demetrios Lafis

use std::collections::{BTreeMap, BTreeSet};

use crate::data::{DataSet, Schema};
use super::{CleaningStage, DropReport, ProcessingError, SchemaError, StageType};

/// Trim, lowercase and replace each whitespace character with `separator`
pub fn normalize_column_name(name: &str, separator: char) -> String {
    name.trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_whitespace() { separator } else { c })
        .collect()
}

/// Normalize column names, then apply positional headers and renames
///
/// Rows are copied unchanged; only the schema is rewritten.
pub struct NormalizeColumnsTransform {
    separator: char,
    positional: Option<Vec<String>>,
    renames: BTreeMap<String, String>,
    expected: Vec<String>,
}

impl NormalizeColumnsTransform {
    pub fn new(separator: char) -> Self {
        NormalizeColumnsTransform {
            separator,
            positional: None,
            renames: BTreeMap::new(),
            expected: Vec::new(),
        }
    }

    /// Replace the header by position before renames are applied
    pub fn with_positional(mut self, names: Vec<String>) -> Self {
        self.positional = Some(names);
        self
    }

    /// Rename columns, keyed by normalized name
    pub fn with_renames(mut self, renames: BTreeMap<String, String>) -> Self {
        self.renames = renames;
        self
    }

    /// Columns that must exist once names are normalized
    pub fn with_expected(mut self, columns: Vec<String>) -> Self {
        self.expected = columns;
        self
    }

    fn normalized_names(&self, schema: &Schema) -> Result<Vec<String>, SchemaError> {
        let names: Vec<String> = match &self.positional {
            Some(positional) => {
                if positional.len() != schema.fields.len() {
                    return Err(SchemaError::HeaderCount {
                        expected: positional.len(),
                        found: schema.fields.len(),
                    });
                }
                positional
                    .iter()
                    .map(|name| normalize_column_name(name, self.separator))
                    .collect()
            }
            None => schema
                .fields
                .iter()
                .map(|field| normalize_column_name(&field.name, self.separator))
                .collect(),
        };

        ensure_unique(&names)?;
        Ok(names)
    }
}

fn ensure_unique(names: &[String]) -> Result<(), SchemaError> {
    let mut seen = BTreeSet::new();
    for name in names {
        if !seen.insert(name.as_str()) {
            return Err(SchemaError::Collision { column: name.clone() });
        }
    }
    Ok(())
}

impl CleaningStage for NormalizeColumnsTransform {
    fn apply(&self, input: &DataSet, _report: &mut DropReport) -> Result<DataSet, ProcessingError> {
        let mut names = self.normalized_names(&input.schema)?;

        for column in &self.expected {
            if !names.contains(column) {
                return Err(SchemaError::missing(column.as_str(), "a field rule").into());
            }
        }

        if let Some(old_name) = self.renames.keys().find(|old| !names.contains(*old)) {
            return Err(SchemaError::missing(old_name.as_str(), "a rename rule").into());
        }

        // Renames are applied simultaneously, so swaps are allowed
        for name in names.iter_mut() {
            if let Some(new_name) = self.renames.get(name.as_str()) {
                *name = new_name.clone();
            }
        }

        // Check for duplicate column names after rename
        ensure_unique(&names)?;

        let mut schema = input.schema.clone();
        for (field, name) in schema.fields.iter_mut().zip(names) {
            field.name = name;
        }

        let mut result = DataSet::derived_from(schema, input);
        result.data = input.data.clone();
        Ok(result)
    }

    fn name(&self) -> &str {
        "normalize_columns"
    }

    fn stage_type(&self) -> StageType {
        StageType::Normalize
    }
}
