use std::fs;
use std::path::PathBuf;

use patmine_ingest::{load_source, load_sources, merge};
use patmine_model::{SourceKind, Value};
use tempfile::TempDir;

fn temp_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).expect("write file");
    path
}

#[test]
fn reads_csv_with_typed_cells() {
    let dir = TempDir::new().expect("temp dir");
    let path = temp_file(
        &dir,
        "deals.csv",
        "deal_value,status,closed,submission_date\n100000,won,true,2024-03-18\n,lost,false,2024-03-02\n\n",
    );
    let source = load_source(&path).expect("load csv");
    assert_eq!(source.name, "deals");
    assert_eq!(source.kind, SourceKind::Crm);
    assert_eq!(source.records.len(), 2);
    let first = &source.records[0];
    assert_eq!(first.get("deal_value"), Some(&Value::Number(100_000.0)));
    assert_eq!(first.get("closed"), Some(&Value::Bool(true)));
    assert_eq!(
        first.get("submission_date"),
        Some(&Value::Text("2024-03-18".to_string()))
    );
    assert_eq!(source.records[1].get("deal_value"), Some(&Value::Null));
}

#[test]
fn reads_full_json_source_object() {
    let dir = TempDir::new().expect("temp dir");
    let path = temp_file(
        &dir,
        "export.json",
        r#"{"name": "finance-2024", "kind": "financial", "records": [
            {"revenue": 1000, "costs": 600, "month": "jan"},
            {"revenue": 1500, "costs": 700, "month": "feb"}
        ]}"#,
    );
    let source = load_source(&path).expect("load json");
    assert_eq!(source.name, "finance-2024");
    assert_eq!(source.kind, SourceKind::Financial);
    assert_eq!(source.records.len(), 2);
}

#[test]
fn unknown_kind_label_falls_back_to_generic() {
    let dir = TempDir::new().expect("temp dir");
    let path = temp_file(
        &dir,
        "misc.json",
        r#"{"kind": "warehouse", "records": [{"bin": "a"}]}"#,
    );
    let source = load_source(&path).expect("load json");
    assert_eq!(source.name, "misc");
    assert_eq!(source.kind, SourceKind::Generic);
}

#[test]
fn rejects_unsupported_extension_and_bad_json() {
    let dir = TempDir::new().expect("temp dir");
    let xlsx = temp_file(&dir, "book.xlsx", "");
    assert!(load_source(&xlsx).is_err());
    let broken = temp_file(&dir, "broken.json", "{not json");
    let error = load_source(&broken).expect_err("malformed json");
    assert!(format!("{error:#}").contains("parse json"));
}

#[test]
fn loaded_sources_merge_completely() {
    let dir = TempDir::new().expect("temp dir");
    let crm = temp_file(&dir, "crm.csv", "deal_value,status\n1,won\n2,lost\n3,won\n");
    let erp = temp_file(&dir, "erp_tasks.json", r#"[{"budget": 10}, {"budget": 20}]"#);
    let sources = load_sources(&[crm, erp]).expect("load sources");
    assert_eq!(sources[1].kind, SourceKind::Erp);
    let merged = merge(&sources);
    assert_eq!(merged.len(), 5);
    assert_eq!(merged[0].source_name(), "crm");
    assert_eq!(merged[4].source_name(), "erp_tasks");
}
