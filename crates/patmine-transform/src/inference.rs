//! Column type inference from a bounded value sample.
//!
//! Each column is scored against every [`ColumnType`]:
//!
//! - date, numeric, boolean: fraction of sampled values that match
//! - categorical: 0.8 when distinct values are at most 30 % of the sample and
//!   at most 20, otherwise 0.2
//! - text: fixed floor of 0.1
//!
//! The strictly highest score wins; ties keep the earlier type in
//! [`ColumnType::EVALUATION_ORDER`].

use std::collections::BTreeSet;

use patmine_model::{ColumnType, ColumnTypeInference, Record, Value};

use crate::datetime::value_to_date;

/// Values sampled per column.
pub const SAMPLE_SIZE: usize = 100;

const CATEGORICAL_MAX_DISTINCT: usize = 20;
const CATEGORICAL_MAX_RATIO: f64 = 0.3;
const CATEGORICAL_HIT: f64 = 0.8;
const CATEGORICAL_MISS: f64 = 0.2;
const TEXT_FLOOR: f64 = 0.1;

const BOOLEAN_LITERALS: [&str; 6] = ["true", "false", "yes", "no", "1", "0"];

/// One inference per field of the first record.
///
/// Fields missing from later records are still evaluated over whatever sample
/// exists.
pub fn detect_column_types<R: AsRef<Record>>(records: &[R]) -> Vec<ColumnTypeInference> {
    let Some(first) = records.first() else {
        return Vec::new();
    };
    first
        .as_ref()
        .fields()
        .map(|column| infer_column(column, records))
        .collect()
}

fn infer_column<R: AsRef<Record>>(column: &str, records: &[R]) -> ColumnTypeInference {
    let sample: Vec<&Value> = records
        .iter()
        .filter_map(|record| record.as_ref().get_present(column))
        .take(SAMPLE_SIZE)
        .collect();
    let (inferred_type, confidence) = classify_sample(&sample);
    ColumnTypeInference {
        column: column.to_string(),
        inferred_type,
        confidence,
    }
}

/// Winning type and its confidence for a sample of non-null values.
pub fn classify_sample(sample: &[&Value]) -> (ColumnType, f64) {
    if sample.is_empty() {
        return (ColumnType::Text, 0.0);
    }
    let mut best = (ColumnType::Text, f64::NEG_INFINITY);
    for column_type in ColumnType::EVALUATION_ORDER {
        let score = type_score(column_type, sample);
        if score > best.1 {
            best = (column_type, score);
        }
    }
    best
}

fn type_score(column_type: ColumnType, sample: &[&Value]) -> f64 {
    let ratio = |matches: fn(&Value) -> bool| {
        sample.iter().filter(|value| matches(value)).count() as f64 / sample.len() as f64
    };
    match column_type {
        ColumnType::Date => ratio(|value| value_to_date(value).is_some()),
        ColumnType::Numeric => ratio(|value| value.to_number().is_some()),
        ColumnType::Boolean => ratio(is_boolean_like),
        ColumnType::Categorical => {
            let distinct: BTreeSet<String> = sample.iter().map(ToString::to_string).collect();
            let distinct_ratio = distinct.len() as f64 / sample.len() as f64;
            if distinct_ratio <= CATEGORICAL_MAX_RATIO && distinct.len() <= CATEGORICAL_MAX_DISTINCT
            {
                CATEGORICAL_HIT
            } else {
                CATEGORICAL_MISS
            }
        }
        ColumnType::Text => TEXT_FLOOR,
    }
}

fn is_boolean_like(value: &Value) -> bool {
    match value {
        Value::Bool(_) => true,
        Value::Text(text) => {
            let lower = text.trim().to_lowercase();
            BOOLEAN_LITERALS.contains(&lower.as_str())
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(column: &str, values: Vec<Value>) -> Vec<Record> {
        values
            .into_iter()
            .map(|value| [(column, value)].into_iter().collect())
            .collect()
    }

    fn infer(values: Vec<Value>) -> ColumnTypeInference {
        let rows = records("col", values);
        detect_column_types(&rows).remove(0)
    }

    #[test]
    fn numeric_strings_are_numeric() {
        let inference = infer(vec!["1.5".into(), "2".into(), Value::from(3.0), " 4 ".into()]);
        assert_eq!(inference.inferred_type, ColumnType::Numeric);
        assert_eq!(inference.confidence, 1.0);
    }

    #[test]
    fn dates_win_ties_over_everything() {
        let inference = infer(vec!["2024-01-15".into(), "2024-02-15".into()]);
        assert_eq!(inference.inferred_type, ColumnType::Date);
        assert_eq!(inference.confidence, 1.0);
    }

    #[test]
    fn offset_stamped_timestamps_are_dates() {
        let inference = infer(vec![
            "2024-01-15T10:30:00+02:00".into(),
            "2024-02-15T09:00:00-05:00".into(),
            "Thu, 15 Feb 2024 09:00:00 GMT".into(),
        ]);
        assert_eq!(inference.inferred_type, ColumnType::Date);
        assert_eq!(inference.confidence, 1.0);
    }

    #[test]
    fn zero_one_strings_prefer_numeric_over_boolean() {
        let inference = infer(vec!["1".into(), "0".into(), "1".into()]);
        assert_eq!(inference.inferred_type, ColumnType::Numeric);
    }

    #[test]
    fn yes_no_is_boolean() {
        let inference = infer(vec!["Yes".into(), "no".into(), Value::Bool(true)]);
        assert_eq!(inference.inferred_type, ColumnType::Boolean);
        assert_eq!(inference.confidence, 1.0);
    }

    #[test]
    fn low_cardinality_text_is_categorical() {
        let values = (0..10)
            .map(|i| Value::from(if i % 2 == 0 { "won" } else { "lost" }))
            .collect();
        let inference = infer(values);
        assert_eq!(inference.inferred_type, ColumnType::Categorical);
        assert_eq!(inference.confidence, 0.8);
    }

    #[test]
    fn high_cardinality_text_falls_to_weak_categorical() {
        let values = (0..10).map(|i| Value::from(format!("note {i}"))).collect();
        let inference = infer(values);
        assert_eq!(inference.inferred_type, ColumnType::Categorical);
        assert_eq!(inference.confidence, 0.2);
    }

    #[test]
    fn empty_sample_is_text_with_zero_confidence() {
        let inference = infer(vec![Value::Null, Value::Null]);
        assert_eq!(inference.inferred_type, ColumnType::Text);
        assert_eq!(inference.confidence, 0.0);
    }

    #[test]
    fn columns_come_from_first_record() {
        let rows: Vec<Record> = vec![
            [("a", Value::from(1))].into_iter().collect(),
            [("a", Value::from(2)), ("b", Value::from("x"))].into_iter().collect(),
        ];
        let inferences = detect_column_types(&rows);
        assert_eq!(inferences.len(), 1);
        assert_eq!(inferences[0].column, "a");
    }

    #[test]
    fn sample_is_bounded() {
        let mut values: Vec<Value> = (0..SAMPLE_SIZE).map(|i| Value::from(i as f64)).collect();
        values.extend((0..50).map(|_| Value::from("n/a")));
        let inference = infer(values);
        assert_eq!(inference.inferred_type, ColumnType::Numeric);
        assert_eq!(inference.confidence, 1.0);
    }
}
