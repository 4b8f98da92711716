//! Union of labelled sources into one provenance-tagged record stream.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{NaiveDateTime, Utc};
use tracing::{debug, warn};

use patmine_model::{DataSource, MergedRecord, Provenance, Record};

/// Null ratio above which a column is reported.
const NULL_WARNING_RATIO: f64 = 0.5;

/// Outcome of [`validate_sources`]. Never short-circuits: every violation is
/// listed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SourceValidation {
    pub is_valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl SourceValidation {
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }
}

/// Concatenate `sources` in order, stamping every record with provenance.
///
/// Records are neither reordered nor deduplicated. All records of one call
/// share one merge timestamp.
pub fn merge(sources: &[DataSource]) -> Vec<MergedRecord> {
    merge_at(sources, Utc::now().naive_utc())
}

/// [`merge`] with an explicit merge timestamp.
pub fn merge_at(sources: &[DataSource], merged_at: NaiveDateTime) -> Vec<MergedRecord> {
    let total: usize = sources.iter().map(DataSource::len).sum();
    let mut merged = Vec::with_capacity(total);
    for source in sources {
        for (index, record) in source.records.iter().enumerate() {
            let provenance = Provenance {
                source_name: source.name.clone(),
                source_kind: source.kind,
                record_id: Provenance::record_id(&source.name, index + 1),
                merged_at,
            };
            merged.push(MergedRecord::new(record.clone(), &provenance));
        }
        debug!(
            source = %source.name,
            kind = %source.kind,
            records = source.len(),
            "merged source"
        );
    }
    merged
}

/// Check `sources` before merging.
///
/// Errors: empty source list, blank or duplicate names, empty record lists.
/// Warnings: expected fields of the source kind that never occur, columns that
/// are mostly null, exact duplicate records.
pub fn validate_sources(sources: &[DataSource]) -> SourceValidation {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    if sources.is_empty() {
        errors.push("no data sources supplied".to_string());
    }

    let mut seen_names = BTreeSet::new();
    for (index, source) in sources.iter().enumerate() {
        let label = if source.name.trim().is_empty() {
            errors.push(format!("source #{} has an empty name", index + 1));
            format!("#{}", index + 1)
        } else {
            source.name.clone()
        };
        if !source.name.trim().is_empty() && !seen_names.insert(source.name.as_str()) {
            errors.push(format!("duplicate source name: {}", source.name));
        }
        if source.records.is_empty() {
            errors.push(format!("source {label} has no records"));
            continue;
        }

        if let Some(schema) = source.kind.schema() {
            let missing = schema.missing_fields(&source.records);
            if !missing.is_empty() {
                warnings.push(format!(
                    "source {label} ({}) is missing expected fields: {}",
                    source.kind,
                    missing.join(", ")
                ));
            }
        }
        warnings.extend(null_heavy_columns(&source.records).into_iter().map(|column| {
            format!("source {label}: column {column} is null in more than half of the records")
        }));
        let duplicates = duplicate_record_count(&source.records);
        if duplicates > 0 {
            warnings.push(format!(
                "source {label} contains {duplicates} duplicate record(s)"
            ));
        }
    }

    for warning in &warnings {
        warn!("{warning}");
    }

    SourceValidation {
        is_valid: errors.is_empty(),
        errors,
        warnings,
    }
}

fn null_heavy_columns(records: &[Record]) -> Vec<String> {
    let mut nulls: BTreeMap<&str, usize> = BTreeMap::new();
    for record in records {
        for field in record.fields() {
            nulls.entry(field).or_insert(0);
        }
    }
    for record in records {
        for (field, count) in nulls.iter_mut() {
            if record.get_present(field).is_none() {
                *count += 1;
            }
        }
    }
    let total = records.len() as f64;
    nulls
        .into_iter()
        .filter(|(_, count)| *count as f64 / total > NULL_WARNING_RATIO)
        .map(|(field, _)| field.to_string())
        .collect()
}

fn duplicate_record_count(records: &[Record]) -> usize {
    let mut seen = BTreeSet::new();
    records
        .iter()
        .filter_map(|record| serde_json::to_string(record).ok())
        .filter(|key| !seen.insert(key.clone()))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use patmine_model::{PROVENANCE_FIELDS, SourceKind, Value};

    fn record(pairs: &[(&str, Value)]) -> Record {
        pairs.iter().cloned().collect()
    }

    #[test]
    fn merges_sources_in_order_with_sequence_ids() {
        let crm = DataSource::new(
            "crm",
            SourceKind::Crm,
            vec![
                record(&[("deal_value", Value::from(100_000)), ("status", Value::from("won"))]),
                record(&[("deal_value", Value::from(100_000)), ("status", Value::from("won"))]),
                record(&[("deal_value", Value::from(100_000)), ("status", Value::from("won"))]),
            ],
        );
        let erp = DataSource::new(
            "erp",
            SourceKind::Erp,
            vec![
                record(&[("budget", Value::from(10))]),
                record(&[("budget", Value::from(20))]),
            ],
        );
        let merged = merge(&[crm, erp]);
        assert_eq!(merged.len(), 5);
        let names: Vec<&str> = merged.iter().map(MergedRecord::source_name).collect();
        assert_eq!(names, vec!["crm", "crm", "crm", "erp", "erp"]);
        assert_eq!(merged[3].record_id(), "erp_1");
        assert_eq!(merged[4].get("budget"), Some(&Value::Number(20.0)));
        for record in &merged {
            for field in PROVENANCE_FIELDS {
                assert!(record.contains(field));
            }
        }
        let stamps: BTreeSet<_> = merged.iter().filter_map(MergedRecord::merged_at).collect();
        assert_eq!(stamps.len(), 1);
    }

    #[test]
    fn validation_collects_every_error() {
        let sources = vec![
            DataSource::new(" ", SourceKind::Generic, vec![]),
            DataSource::new("crm", SourceKind::Crm, vec![record(&[("status", Value::from("won"))])]),
            DataSource::new("crm", SourceKind::Crm, vec![]),
        ];
        let validation = validate_sources(&sources);
        assert!(!validation.is_valid);
        assert_eq!(
            validation.errors,
            vec![
                "source #1 has an empty name".to_string(),
                "source #1 has no records".to_string(),
                "duplicate source name: crm".to_string(),
                "source crm has no records".to_string(),
            ]
        );
    }

    #[test]
    fn empty_source_list_is_invalid() {
        let validation = validate_sources(&[]);
        assert!(!validation.is_valid);
        assert_eq!(validation.error_count(), 1);
    }

    #[test]
    fn warnings_do_not_invalidate() {
        let repeated = record(&[("sector", Value::from("energy")), ("note", Value::Null)]);
        let sources = vec![DataSource::new(
            "crm",
            SourceKind::Crm,
            vec![repeated.clone(), repeated],
        )];
        let validation = validate_sources(&sources);
        assert!(validation.is_valid);
        assert!(validation.warnings.iter().any(|w| w.contains("missing expected fields")));
        assert!(validation.warnings.iter().any(|w| w.contains("column note")));
        assert!(validation.warnings.iter().any(|w| w.contains("1 duplicate record")));
    }
}
