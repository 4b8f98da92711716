//! Post-cleaning sanity checks.

use std::collections::BTreeMap;

use patmine_model::Record;

/// Only emptiness and missing columns are errors; nulls are warnings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanedDataValidation {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// Check cleaned records against the columns of the first record.
pub fn validate_cleaned_data(records: &[Record]) -> CleanedDataValidation {
    let Some(first) = records.first() else {
        return CleanedDataValidation {
            is_valid: false,
            errors: vec!["no records after cleaning".to_string()],
            warnings: Vec::new(),
        };
    };

    let mut missing: BTreeMap<&str, usize> = BTreeMap::new();
    let mut nulls: BTreeMap<&str, usize> = BTreeMap::new();
    for record in records {
        for column in first.fields() {
            match record.get(column) {
                None => *missing.entry(column).or_insert(0) += 1,
                Some(value) if value.is_null() => *nulls.entry(column).or_insert(0) += 1,
                Some(_) => {}
            }
        }
    }

    let errors: Vec<String> = missing
        .into_iter()
        .map(|(column, count)| format!("column {column} is missing from {count} record(s)"))
        .collect();
    let warnings = nulls
        .into_iter()
        .map(|(column, count)| format!("column {column} has {count} null value(s)"))
        .collect();
    CleanedDataValidation {
        is_valid: errors.is_empty(),
        errors,
        warnings,
    }
}
