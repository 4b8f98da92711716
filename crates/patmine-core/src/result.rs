//! Output of an analysis run.

use chrono::{DateTime, Utc};
use serde::Serialize;

use patmine_model::RankedPattern;
use patmine_score::ScoringStatistics;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisMetadata {
    pub total_records: usize,
    pub data_source_count: usize,
    /// Candidates produced by every miner and detector, before ranking.
    pub patterns_detected: usize,
    /// Mean confidence of the ranked patterns, in percent. 0 when none ranked.
    pub overall_confidence_percent: f64,
    pub timestamp: DateTime<Utc>,
    pub processing_time_ms: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationCounts {
    pub valid_count: usize,
    pub invalid_count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisStatistics {
    pub scoring: ScoringStatistics,
    pub validation: ValidationCounts,
}

/// A detector that could not establish its pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedDetector {
    pub id: String,
    pub title: String,
    pub required_fields: Vec<String>,
}

/// Complete result of one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Ranked best first, at most `maxPatterns`.
    pub patterns: Vec<RankedPattern>,
    pub analysis_metadata: AnalysisMetadata,
    pub statistics: AnalysisStatistics,
    pub skipped_detectors: Vec<SkippedDetector>,
}

impl AnalysisResult {
    pub fn pattern_ids(&self) -> Vec<&str> {
        self.patterns.iter().map(RankedPattern::id).collect()
    }
}
