//! JSON export envelope and file helpers.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use patmine_model::RankedPattern;

/// Version stamped into every export.
pub const EXPORT_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportMetadata {
    pub exported_at: DateTime<Utc>,
    pub total_patterns: usize,
    pub version: String,
}

/// The exported document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternExport {
    pub patterns: Vec<RankedPattern>,
    pub export_metadata: ExportMetadata,
}

impl PatternExport {
    pub fn new(patterns: Vec<RankedPattern>) -> Self {
        Self::at(patterns, Utc::now())
    }

    pub fn at(patterns: Vec<RankedPattern>, exported_at: DateTime<Utc>) -> Self {
        Self {
            export_metadata: ExportMetadata {
                exported_at,
                total_patterns: patterns.len(),
                version: EXPORT_VERSION.to_string(),
            },
            patterns,
        }
    }
}

/// Import accepts the full document or a bare pattern list.
#[derive(Deserialize)]
#[serde(untagged)]
enum ImportDocument {
    Export { patterns: Vec<RankedPattern> },
    Bare(Vec<RankedPattern>),
}

/// Pretty-printed export document for `patterns`.
pub fn export_patterns_to_json(patterns: &[RankedPattern]) -> String {
    let document = PatternExport::new(patterns.to_vec());
    match serde_json::to_string_pretty(&document) {
        Ok(json) => json,
        Err(error) => {
            warn!(%error, "pattern export fell back to an empty document");
            format!(
                r#"{{"patterns":[],"exportMetadata":{{"exportedAt":"{}","totalPatterns":0,"version":"{EXPORT_VERSION}"}}}}"#,
                document.export_metadata.exported_at.to_rfc3339()
            )
        }
    }
}

/// Patterns from an export document, or an empty list when `json` is malformed.
pub fn import_patterns_from_json(json: &str) -> Vec<RankedPattern> {
    match serde_json::from_str::<ImportDocument>(json) {
        Ok(ImportDocument::Export { patterns } | ImportDocument::Bare(patterns)) => {
            debug!(patterns = patterns.len(), "imported patterns");
            patterns
        }
        Err(error) => {
            warn!(%error, "ignoring malformed pattern export");
            Vec::new()
        }
    }
}

/// Write the export document for `patterns` to `path`, creating parent directories.
pub fn write_pattern_export(path: &Path, patterns: &[RankedPattern]) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    fs::write(path, export_patterns_to_json(patterns))
        .with_context(|| format!("write {}", path.display()))
}

/// Read an export document from `path`.
///
/// Only I/O failures are errors; malformed content reads as no patterns.
pub fn read_pattern_export(path: &Path) -> Result<Vec<RankedPattern>> {
    let json = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    Ok(import_patterns_from_json(&json))
}

#[cfg(test)]
mod tests {
    use super::*;
    use patmine_model::{PatternCandidate, PatternOrigin, PatternScore};

    fn ranked(id: &str) -> RankedPattern {
        RankedPattern {
            pattern: PatternCandidate::new(id, "Title", "Description", PatternOrigin::Domain),
            scores: PatternScore {
                pattern_id: id.to_string(),
                support: 0.3,
                confidence: 0.8,
                lift: 1.5,
                conviction: 2.0,
                impact: 0.4,
                complexity: 0.5,
                overall_score: 0.6,
            },
        }
    }

    #[test]
    fn export_carries_metadata() {
        let json = export_patterns_to_json(&[ranked("a"), ranked("b")]);
        let document: PatternExport = serde_json::from_str(&json).expect("valid export");
        assert_eq!(document.export_metadata.total_patterns, 2);
        assert_eq!(document.export_metadata.version, EXPORT_VERSION);
        assert!(json.contains("\"exportMetadata\""));
        assert!(json.contains("\"overallScore\""));
    }

    #[test]
    fn malformed_input_imports_nothing() {
        assert!(import_patterns_from_json("").is_empty());
        assert!(import_patterns_from_json("{not json").is_empty());
        assert!(import_patterns_from_json(r#"{"patterns": 3}"#).is_empty());
    }

    #[test]
    fn bare_lists_are_accepted() {
        let json = serde_json::to_string(&vec![ranked("a")]).expect("serialize");
        assert_eq!(import_patterns_from_json(&json), vec![ranked("a")]);
    }
}
