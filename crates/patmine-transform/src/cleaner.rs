//! Per-type value conversion and derived feature generation.

use std::collections::BTreeMap;

use tracing::debug;

use patmine_model::record::SOURCE_KIND_FIELD;
use patmine_model::{
    CleaningConfig, ColumnType, ColumnTypeInference, Record, SourceKind, Value, is_reserved_field,
};

use crate::datetime::{DateParts, value_to_date};
use crate::numeric::{ColumnStats, discretize};

/// Inferred types at or below this confidence are not acted on.
pub const AUTO_COLUMN_CONFIDENCE: f64 = 0.7;

/// Columns the cleaner converts, per type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleaningPlan {
    pub date_columns: Vec<String>,
    pub numeric_columns: Vec<String>,
    pub categorical_columns: Vec<String>,
}

impl CleaningPlan {
    /// Explicit overrides plus every confidently inferred column, deduplicated.
    ///
    /// Provenance fields are never added automatically.
    pub fn resolve(config: &CleaningConfig, column_types: &[ColumnTypeInference]) -> Self {
        let mut plan = Self {
            date_columns: dedup(&config.date_columns),
            numeric_columns: dedup(&config.numeric_columns),
            categorical_columns: dedup(&config.categorical_columns),
        };
        for inference in column_types {
            if inference.confidence <= AUTO_COLUMN_CONFIDENCE || is_reserved_field(&inference.column)
            {
                continue;
            }
            let target = match inference.inferred_type {
                ColumnType::Date => &mut plan.date_columns,
                ColumnType::Numeric => &mut plan.numeric_columns,
                ColumnType::Categorical => &mut plan.categorical_columns,
                ColumnType::Boolean | ColumnType::Text => continue,
            };
            if !target.contains(&inference.column) {
                target.push(inference.column.clone());
            }
        }
        plan
    }
}

fn dedup(columns: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(columns.len());
    for column in columns {
        if !out.contains(column) {
            out.push(column.clone());
        }
    }
    out
}

/// Convert and enrich `records` according to the inferred column types.
///
/// Numeric statistics are computed over the whole input before any record is
/// transformed. Unparseable values are left untouched and produce no derived
/// fields.
pub fn clean_and_transform<R: AsRef<Record>>(
    records: &[R],
    column_types: &[ColumnTypeInference],
    config: &CleaningConfig,
) -> Vec<Record> {
    let plan = CleaningPlan::resolve(config, column_types);
    let stats = numeric_column_stats(records, &plan.numeric_columns);
    debug!(
        date_columns = plan.date_columns.len(),
        numeric_columns = plan.numeric_columns.len(),
        categorical_columns = plan.categorical_columns.len(),
        "cleaning plan"
    );
    records
        .iter()
        .map(|record| clean_record(record.as_ref(), &plan, &stats, config))
        .collect()
}

/// Statistics per numeric column over every value that parses as a number.
pub fn numeric_column_stats<R: AsRef<Record>>(
    records: &[R],
    columns: &[String],
) -> BTreeMap<String, ColumnStats> {
    columns
        .iter()
        .filter_map(|column| {
            let values = records
                .iter()
                .filter_map(|record| record.as_ref().get(column).and_then(Value::to_number));
            ColumnStats::from_values(values).map(|stats| (column.clone(), stats))
        })
        .collect()
}

fn clean_record(
    record: &Record,
    plan: &CleaningPlan,
    stats: &BTreeMap<String, ColumnStats>,
    config: &CleaningConfig,
) -> Record {
    let mut cleaned = record.clone();
    // A column listed under several types is converted by the first list only.
    let mut converted: Vec<&str> = Vec::new();

    for column in &plan.date_columns {
        let Some(date) = record.get(column).and_then(value_to_date) else {
            continue;
        };
        let parts = DateParts::of(date);
        cleaned.insert(column.as_str(), date);
        cleaned.insert(format!("{column}_year"), parts.year);
        cleaned.insert(format!("{column}_month"), parts.month);
        cleaned.insert(format!("{column}_quarter"), parts.quarter);
        cleaned.insert(format!("{column}_dayofweek"), parts.day_of_week);
        converted.push(column.as_str());
    }

    for column in &plan.numeric_columns {
        if converted.contains(&column.as_str()) {
            continue;
        }
        let Some(number) = record.get(column).and_then(Value::to_number) else {
            continue;
        };
        cleaned.insert(column.as_str(), number);
        if let Some(column_stats) = stats.get(column) {
            cleaned.insert(
                format!("{column}_bin"),
                discretize(number, column_stats, config.max_bins),
            );
        }
        converted.push(column.as_str());
    }

    for column in &plan.categorical_columns {
        if converted.contains(&column.as_str()) {
            continue;
        }
        let Some(value) = record.get_present(column) else {
            continue;
        };
        let normalized = match value {
            Value::Text(text) => text.trim().to_lowercase(),
            other => other.to_string().trim().to_lowercase(),
        };
        cleaned.insert(column.as_str(), normalized);
    }

    if config.derive_kind_features {
        derive_kind_features(&mut cleaned);
    }
    cleaned
}

/// Fill in well-known business measures a source kind implies.
///
/// - financial: `profit_margin = (revenue - costs) / revenue`
/// - crm: `win_rate = 1` when the status is `won`, else 0
///
/// Existing values are never overwritten.
pub fn derive_kind_features(record: &mut Record) {
    let kind = record
        .get(SOURCE_KIND_FIELD)
        .and_then(Value::as_str)
        .map(SourceKind::from_label);
    match kind {
        Some(SourceKind::Financial) if record.get_present("profit_margin").is_none() => {
            let revenue = record.get("revenue").and_then(Value::to_number);
            let costs = record.get("costs").and_then(Value::to_number);
            if let (Some(revenue), Some(costs)) = (revenue, costs)
                && revenue != 0.0
            {
                record.insert("profit_margin", (revenue - costs) / revenue);
            }
        }
        Some(SourceKind::Crm) if record.get_present("win_rate").is_none() => {
            if let Some(status) = record.get_present("status") {
                let won = status.to_string().trim().eq_ignore_ascii_case("won");
                record.insert("win_rate", if won { 1.0 } else { 0.0 });
            }
        }
        _ => {}
    }
}
