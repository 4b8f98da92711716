use patmine_model::record::SOURCE_KIND_FIELD;
use patmine_model::{CleaningConfig, ColumnType, Record, Value};
use patmine_transform::{clean_and_transform, detect_column_types, validate_cleaned_data};

fn tender(date: &str, status: &str, value: f64) -> Record {
    [
        (SOURCE_KIND_FIELD, Value::from("tenders")),
        ("submission_date", Value::from(date)),
        ("status", Value::from(status)),
        ("value", Value::from(value)),
    ]
    .into_iter()
    .collect()
}

#[test]
fn tender_records_are_typed_cleaned_and_valid() {
    let records: Vec<Record> = (1..=12)
        .map(|day| {
            let status = if day % 3 == 0 { "Won" } else { "LOST" };
            tender(&format!("2024-05-{day:02}"), status, f64::from(day) * 1000.0)
        })
        .collect();

    let types = detect_column_types(&records);
    let type_of = |column: &str| {
        types
            .iter()
            .find(|inference| inference.column == column)
            .map(|inference| inference.inferred_type)
    };
    assert_eq!(type_of("submission_date"), Some(ColumnType::Date));
    assert_eq!(type_of("value"), Some(ColumnType::Numeric));
    assert_eq!(type_of("status"), Some(ColumnType::Categorical));

    let cleaned = clean_and_transform(&records, &types, &CleaningConfig::default());
    assert_eq!(cleaned.len(), records.len());
    let first = &cleaned[0];
    assert_eq!(first.get("status"), Some(&Value::from("lost")));
    assert_eq!(first.get("submission_date_month"), Some(&Value::Number(5.0)));
    assert_eq!(first.get("submission_date_quarter"), Some(&Value::Number(2.0)));
    assert_eq!(first.get("value_bin"), Some(&Value::from("bin_1")));
    // Provenance text is never lowercased or typed.
    assert_eq!(first.get(SOURCE_KIND_FIELD), Some(&Value::from("tenders")));

    let validation = validate_cleaned_data(&cleaned);
    assert!(validation.is_valid, "{:?}", validation.errors);
}

#[test]
fn derived_bin_feature_renders_stably() {
    let records: Vec<Record> = [1.0, 2.0, 3.0, 4.0]
        .into_iter()
        .map(|v| [("amount", Value::from(v))].into_iter().collect())
        .collect();
    let types = detect_column_types(&records);
    let cleaned = clean_and_transform(&records, &types, &CleaningConfig::default());
    let rendered: Vec<String> = cleaned
        .iter()
        .map(|record| {
            record
                .iter()
                .map(|(field, value)| format!("{field}={value}"))
                .collect::<Vec<_>>()
                .join(" ")
        })
        .collect();
    insta::assert_snapshot!(rendered.join("\n"), @r"
    amount=1 amount_bin=bin_1
    amount=2 amount_bin=bin_2
    amount=3 amount_bin=bin_3
    amount=4 amount_bin=bin_3
    ");
}
