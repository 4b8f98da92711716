//! Records and their merged, provenance-tagged form.

use std::collections::BTreeMap;
use std::ops::Deref;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::source::SourceKind;
use crate::value::Value;

/// Fields starting with this prefix are engine metadata, never business data.
pub const RESERVED_PREFIX: &str = "__";

pub const SOURCE_NAME_FIELD: &str = "__source_name";
pub const SOURCE_KIND_FIELD: &str = "__source_kind";
pub const RECORD_ID_FIELD: &str = "__record_id";
pub const MERGED_AT_FIELD: &str = "__merged_at";

/// The four provenance fields every merged record carries.
pub const PROVENANCE_FIELDS: [&str; 4] = [
    SOURCE_NAME_FIELD,
    SOURCE_KIND_FIELD,
    RECORD_ID_FIELD,
    MERGED_AT_FIELD,
];

pub fn is_reserved_field(name: &str) -> bool {
    name.starts_with(RESERVED_PREFIX)
}

/// A mapping from field name to value. Schemas vary per source.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(BTreeMap<String, Value>);

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Value of `field` unless absent or null.
    pub fn get_present(&self, field: &str) -> Option<&Value> {
        self.0.get(field).filter(|value| !value.is_null())
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(field.into(), value.into())
    }

    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.0.remove(field)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(field, value)| (field.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// First field of `candidates` holding a non-null value.
    pub fn first_present<'a>(&self, candidates: &[&'a str]) -> Option<(&'a str, &Value)> {
        candidates
            .iter()
            .find_map(|field| self.get_present(field).map(|value| (*field, value)))
    }

    /// First field of `candidates` whose value is numeric.
    pub fn first_number<'a>(&self, candidates: &[&'a str]) -> Option<(&'a str, f64)> {
        candidates.iter().find_map(|field| {
            self.get(field)
                .and_then(Value::to_number)
                .map(|number| (*field, number))
        })
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(field, value)| (field.into(), value.into()))
                .collect(),
        )
    }
}

impl From<BTreeMap<String, Value>> for Record {
    fn from(fields: BTreeMap<String, Value>) -> Self {
        Self(fields)
    }
}

impl AsRef<Record> for Record {
    fn as_ref(&self) -> &Record {
        self
    }
}

impl IntoIterator for Record {
    type Item = (String, Value);
    type IntoIter = std::collections::btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Where a merged record came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Provenance {
    pub source_name: String,
    pub source_kind: SourceKind,
    pub record_id: String,
    pub merged_at: NaiveDateTime,
}

impl Provenance {
    /// Record ids are unique per run: source name plus 1-based sequence.
    pub fn record_id(source_name: &str, sequence: usize) -> String {
        format!("{source_name}_{sequence}")
    }
}

/// A record tagged with the four provenance fields.
///
/// Only constructible through [`MergedRecord::new`], which guarantees the
/// provenance fields are present whatever the source schema was.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct MergedRecord(Record);

impl MergedRecord {
    pub fn new(mut record: Record, provenance: &Provenance) -> Self {
        record.insert(SOURCE_NAME_FIELD, provenance.source_name.as_str());
        record.insert(SOURCE_KIND_FIELD, provenance.source_kind.as_str());
        record.insert(RECORD_ID_FIELD, provenance.record_id.as_str());
        record.insert(MERGED_AT_FIELD, provenance.merged_at);
        Self(record)
    }

    pub fn source_name(&self) -> &str {
        self.0
            .get(SOURCE_NAME_FIELD)
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    pub fn source_kind(&self) -> SourceKind {
        self.0
            .get(SOURCE_KIND_FIELD)
            .and_then(Value::as_str)
            .map(SourceKind::from_label)
            .unwrap_or_default()
    }

    pub fn record_id(&self) -> &str {
        self.0
            .get(RECORD_ID_FIELD)
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    pub fn merged_at(&self) -> Option<NaiveDateTime> {
        self.0.get(MERGED_AT_FIELD).and_then(Value::as_date)
    }

    pub fn record(&self) -> &Record {
        &self.0
    }

    pub fn into_record(self) -> Record {
        self.0
    }
}

impl AsRef<Record> for MergedRecord {
    fn as_ref(&self) -> &Record {
        &self.0
    }
}

impl Deref for MergedRecord {
    type Target = Record;

    fn deref(&self) -> &Record {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn merged_at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .and_then(|d| d.and_hms_opt(12, 0, 0))
            .expect("valid timestamp")
    }

    #[test]
    fn merged_record_carries_provenance() {
        let record: Record = [("deal_value", Value::from(100_000.0))].into_iter().collect();
        let provenance = Provenance {
            source_name: "crm-export".to_string(),
            source_kind: SourceKind::Crm,
            record_id: Provenance::record_id("crm-export", 1),
            merged_at: merged_at(),
        };
        let merged = MergedRecord::new(record, &provenance);
        for field in PROVENANCE_FIELDS {
            assert!(merged.contains(field), "missing {field}");
        }
        assert_eq!(merged.source_name(), "crm-export");
        assert_eq!(merged.source_kind(), SourceKind::Crm);
        assert_eq!(merged.record_id(), "crm-export_1");
        assert_eq!(merged.merged_at(), Some(merged_at()));
        assert_eq!(merged.get("deal_value"), Some(&Value::Number(100_000.0)));
    }

    #[test]
    fn first_present_skips_nulls() {
        let record: Record = [("date", Value::Null), ("created_date", Value::from("2024-01-01"))]
            .into_iter()
            .collect();
        let (field, _) = record
            .first_present(&["date", "created_date"])
            .expect("created_date present");
        assert_eq!(field, "created_date");
    }

    #[test]
    fn reserved_prefix_detection() {
        assert!(is_reserved_field("__record_id"));
        assert!(!is_reserved_field("_private"));
        assert!(!is_reserved_field("status"));
    }
}
