use patmine_ingest::{merge, validate_sources};
use patmine_model::{DataSource, PROVENANCE_FIELDS, Record, SourceKind, Value};
use proptest::prelude::*;

fn arb_record() -> impl Strategy<Value = Record> {
    proptest::collection::btree_map("[a-z]{1,6}", -1000i32..1000, 0..5)
        .prop_map(|fields| fields.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
}

fn arb_sources() -> impl Strategy<Value = Vec<DataSource>> {
    proptest::collection::vec(proptest::collection::vec(arb_record(), 0..12), 0..5).prop_map(
        |batches| {
            batches
                .into_iter()
                .enumerate()
                .map(|(index, records)| {
                    let kind = SourceKind::ALL[index % SourceKind::ALL.len()];
                    DataSource::new(format!("source_{index}"), kind, records)
                })
                .collect()
        },
    )
}

proptest! {
    #[test]
    fn merge_is_complete_and_tagged(sources in arb_sources()) {
        let merged = merge(&sources);
        let expected: usize = sources.iter().map(DataSource::len).sum();
        prop_assert_eq!(merged.len(), expected);
        for record in &merged {
            for field in PROVENANCE_FIELDS {
                prop_assert!(record.contains(field));
            }
        }
        let mut offset = 0;
        for source in &sources {
            for (index, original) in source.records.iter().enumerate() {
                let tagged = &merged[offset + index];
                prop_assert_eq!(tagged.source_name(), source.name.as_str());
                for (field, value) in original.iter() {
                    prop_assert_eq!(tagged.get(field), Some(value));
                }
            }
            offset += source.len();
        }
    }

    #[test]
    fn validity_matches_error_list(sources in arb_sources()) {
        let validation = validate_sources(&sources);
        prop_assert_eq!(validation.is_valid, validation.errors.is_empty());
        let empty_sources = sources.iter().filter(|s| s.is_empty()).count();
        if sources.is_empty() {
            prop_assert!(!validation.is_valid);
        } else {
            prop_assert_eq!(validation.errors.len(), empty_sources);
        }
    }
}
