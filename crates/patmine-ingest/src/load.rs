//! Reading data sources from CSV and JSON files.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use csv::ReaderBuilder;
use serde_json::Value as JsonValue;
use tracing::{debug, info};

use patmine_model::{DataSource, Record, SourceKind, SourceName, Value};

/// Load one source; the format follows the file extension.
pub fn load_source(path: &Path) -> Result<DataSource> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    let source = match extension.as_str() {
        "json" => load_json_source(path)?,
        "csv" => load_csv_source(path)?,
        other => bail!(
            "unsupported source format {other:?}: {} (expected .csv or .json)",
            path.display()
        ),
    };
    info!(
        source = %source.name,
        kind = %source.kind,
        records = source.len(),
        path = %path.display(),
        "loaded source"
    );
    Ok(source)
}

pub fn load_sources<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<DataSource>> {
    paths.iter().map(|path| load_source(path.as_ref())).collect()
}

fn default_name(path: &Path) -> Result<SourceName> {
    let stem = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or_default();
    SourceName::new(stem).with_context(|| format!("derive source name: {}", path.display()))
}

fn detect_kind(path: &Path) -> SourceKind {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or_default();
    SourceKind::detect_from_name(file_name)
}

/// A JSON source is either a full `{name, kind, records}` object or a bare
/// array of record objects.
pub fn load_json_source(path: &Path) -> Result<DataSource> {
    let text = fs::read_to_string(path).with_context(|| format!("read json: {}", path.display()))?;
    let json: JsonValue =
        serde_json::from_str(&text).with_context(|| format!("parse json: {}", path.display()))?;
    parse_json_source(json, path)
}

fn parse_json_source(json: JsonValue, path: &Path) -> Result<DataSource> {
    let mut violations = Vec::new();
    let (name, kind, raw_records) = match json {
        JsonValue::Array(items) => (None, None, Some(items)),
        JsonValue::Object(mut object) => {
            let name = match object.remove("name") {
                Some(JsonValue::String(name)) => Some(name),
                Some(_) => {
                    violations.push("name is not a string".to_string());
                    None
                }
                None => None,
            };
            let kind = match object.remove("kind") {
                Some(JsonValue::String(label)) if label.trim().is_empty() => {
                    violations.push("kind is empty".to_string());
                    None
                }
                Some(JsonValue::String(label)) => Some(SourceKind::from_label(&label)),
                Some(_) => {
                    violations.push("kind is not a string".to_string());
                    None
                }
                None => None,
            };
            let records = match object.remove("records") {
                Some(JsonValue::Array(items)) => Some(items),
                Some(_) => {
                    violations.push("records is not a list".to_string());
                    None
                }
                None => {
                    violations.push("records is missing".to_string());
                    None
                }
            };
            (name, kind, records)
        }
        _ => bail!(
            "{}: expected a source object or an array of records",
            path.display()
        ),
    };

    let mut records = Vec::new();
    for (index, item) in raw_records.into_iter().flatten().enumerate() {
        match item {
            JsonValue::Object(_) => records.push(
                serde_json::from_value::<Record>(item)
                    .with_context(|| format!("record {} of {}", index + 1, path.display()))?,
            ),
            _ => violations.push(format!("record {} is not an object", index + 1)),
        }
    }

    if !violations.is_empty() {
        bail!(
            "invalid source {}:\n{}",
            path.display(),
            violations
                .iter()
                .map(|violation| format!("- {violation}"))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    let name = match name {
        Some(name) => SourceName::new(name)
            .with_context(|| format!("source name in {}", path.display()))?,
        None => default_name(path)?,
    };
    let kind = kind.unwrap_or_else(|| detect_kind(path));
    Ok(DataSource::new(name.into_inner(), kind, records))
}

/// Read a headed CSV file. Cells are typed as number, boolean, text or null.
pub fn load_csv_source(path: &Path) -> Result<DataSource> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("read csv: {}", path.display()))?;
    let headers: Vec<String> = reader
        .headers()
        .with_context(|| format!("read headers: {}", path.display()))?
        .iter()
        .map(normalize_header)
        .collect();
    let mut records = Vec::new();
    for row in reader.records() {
        let row = row.with_context(|| format!("read record: {}", path.display()))?;
        if row.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        let record: Record = headers
            .iter()
            .enumerate()
            .filter(|(_, header)| !header.is_empty())
            .map(|(idx, header)| (header.as_str(), typed_cell(row.get(idx).unwrap_or(""))))
            .collect();
        records.push(record);
    }
    debug!(columns = headers.len(), rows = records.len(), "read csv");
    Ok(DataSource::new(
        default_name(path)?.into_inner(),
        detect_kind(path),
        records,
    ))
}

fn normalize_header(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').to_string()
}

/// Type a raw CSV cell: empty is null, `true`/`false` are booleans, finite
/// numbers are numbers, everything else stays text.
pub fn typed_cell(raw: &str) -> Value {
    let trimmed = raw.trim().trim_matches('\u{feff}');
    if trimmed.is_empty() {
        return Value::Null;
    }
    if trimmed.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if trimmed.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }
    match trimmed.parse::<f64>() {
        Ok(number) if number.is_finite() => Value::Number(number),
        _ => Value::Text(trimmed.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_cells() {
        assert_eq!(typed_cell(""), Value::Null);
        assert_eq!(typed_cell(" TRUE "), Value::Bool(true));
        assert_eq!(typed_cell("42"), Value::Number(42.0));
        assert_eq!(typed_cell("NaN"), Value::Text("NaN".to_string()));
        assert_eq!(typed_cell("won"), Value::Text("won".to_string()));
    }

    #[test]
    fn json_object_violations_are_listed_together() {
        let json: JsonValue =
            serde_json::from_str(r#"{"name": "crm", "kind": "", "records": {"a": 1}}"#)
                .expect("valid json");
        let error = parse_json_source(json, Path::new("crm.json")).expect_err("invalid source");
        let message = error.to_string();
        assert!(message.contains("- kind is empty"));
        assert!(message.contains("- records is not a list"));
    }

    #[test]
    fn bare_array_detects_kind_from_file_name() {
        let json: JsonValue =
            serde_json::from_str(r#"[{"deal_value": 5000, "status": "won"}]"#).expect("json");
        let source = parse_json_source(json, Path::new("/data/sales_q3.json")).expect("source");
        assert_eq!(source.name, "sales_q3");
        assert_eq!(source.kind, SourceKind::Crm);
        assert_eq!(source.records.len(), 1);
    }
}
