//! End-to-end analysis: validate, merge, clean, mine, detect, score, validate.
//!
//! Every run works on its own snapshot of the sources; nothing computed here
//! outlives the call.

use std::fmt;
use std::time::Instant;

use chrono::Utc;
use tracing::{debug, info, info_span, warn};

use patmine_ingest::{merge_at, validate_sources};
use patmine_mining::{
    AssociationMiner, TemporalMiner, encode_transactions, rule_to_candidate,
    temporal_to_candidate,
};
use patmine_model::{AnalysisConfig, AnalysisError, DataSource, Detection, PatternCandidate};
use patmine_score::{ScoringStatistics, score_and_rank};
use patmine_transform::{clean_and_transform, detect_column_types, validate_cleaned_data};
use patmine_validate::validate_patterns;

use crate::detectors::{DetectionContext, DetectorRegistry};
use crate::result::{
    AnalysisMetadata, AnalysisResult, AnalysisStatistics, SkippedDetector, ValidationCounts,
};

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Validate,
    Merge,
    Clean,
    Associations,
    Temporal,
    Detectors,
    Scoring,
    Validation,
}

impl Stage {
    pub const ALL: [Stage; 8] = [
        Stage::Validate,
        Stage::Merge,
        Stage::Clean,
        Stage::Associations,
        Stage::Temporal,
        Stage::Detectors,
        Stage::Scoring,
        Stage::Validation,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Validate => "validate",
            Self::Merge => "merge",
            Self::Clean => "clean",
            Self::Associations => "associations",
            Self::Temporal => "temporal",
            Self::Detectors => "detectors",
            Self::Scoring => "scoring",
            Self::Validation => "validation",
        }
    }

    fn position(self) -> usize {
        Self::ALL
            .iter()
            .position(|stage| *stage == self)
            .map_or(0, |index| index + 1)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Emitted after a stage completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageEvent {
    pub stage: Stage,
    /// Stages completed so far, including this one.
    pub completed: usize,
    pub total: usize,
}

impl StageEvent {
    fn completed(stage: Stage) -> Self {
        Self {
            stage,
            completed: stage.position(),
            total: Stage::ALL.len(),
        }
    }
}

/// Run the full analysis without progress reporting.
pub fn analyze(
    sources: &[DataSource],
    config: &AnalysisConfig,
) -> Result<AnalysisResult, AnalysisError> {
    analyze_with_progress(sources, config, |_| {})
}

/// Run the full analysis, reporting each completed stage to `observer`.
///
/// # Errors
///
/// [`AnalysisError::EmptySources`] when `sources` is empty and
/// [`AnalysisError::InvalidSources`] listing every violation when source
/// validation fails. Detectors lacking data never fail the run.
pub fn analyze_with_progress<F>(
    sources: &[DataSource],
    config: &AnalysisConfig,
    mut observer: F,
) -> Result<AnalysisResult, AnalysisError>
where
    F: FnMut(StageEvent),
{
    let run_span = info_span!("analysis", sources = sources.len());
    let _run_guard = run_span.enter();
    let run_start = Instant::now();
    let now = Utc::now();
    let mut notify = |stage: Stage| observer(StageEvent::completed(stage));

    // ===== Stage 1: Validate sources =====
    if sources.is_empty() {
        return Err(AnalysisError::EmptySources);
    }
    let source_validation = validate_sources(sources);
    if !source_validation.is_valid {
        warn!(
            errors = source_validation.error_count(),
            "source validation failed"
        );
        return Err(AnalysisError::InvalidSources {
            errors: source_validation.errors,
        });
    }
    notify(Stage::Validate);

    // ===== Stage 2: Merge =====
    let merged = info_span!("merge").in_scope(|| {
        let start = Instant::now();
        let merged = merge_at(sources, now.naive_utc());
        info!(
            records = merged.len(),
            duration_ms = start.elapsed().as_millis(),
            "merge complete"
        );
        merged
    });
    notify(Stage::Merge);

    // ===== Stage 3: Clean =====
    let cleaned = info_span!("clean").in_scope(|| {
        let start = Instant::now();
        let column_types = detect_column_types(&merged);
        let cleaned = clean_and_transform(&merged, &column_types, &config.cleaning);
        let check = validate_cleaned_data(&cleaned);
        for warning in &check.warnings {
            debug!(%warning, "cleaned data");
        }
        for error in &check.errors {
            warn!(%error, "cleaned data");
        }
        info!(
            records = cleaned.len(),
            columns = column_types.len(),
            duration_ms = start.elapsed().as_millis(),
            "clean complete"
        );
        cleaned
    });
    notify(Stage::Clean);

    let mut candidates: Vec<PatternCandidate> = Vec::new();

    // ===== Stage 4: Association rules =====
    info_span!("associations").in_scope(|| {
        let start = Instant::now();
        let transactions = encode_transactions(&cleaned);
        let rules = AssociationMiner::from_config(config).mine(&transactions);
        candidates.extend(rules.iter().map(rule_to_candidate));
        info!(
            transactions = transactions.len(),
            rules = rules.len(),
            duration_ms = start.elapsed().as_millis(),
            "association mining complete"
        );
    });
    notify(Stage::Associations);

    // ===== Stage 5: Temporal patterns =====
    info_span!("temporal").in_scope(|| {
        let start = Instant::now();
        let patterns = TemporalMiner::new(config.fields.clone()).mine(&cleaned);
        candidates.extend(patterns.iter().map(temporal_to_candidate));
        info!(
            patterns = patterns.len(),
            duration_ms = start.elapsed().as_millis(),
            "temporal mining complete"
        );
    });
    notify(Stage::Temporal);

    // ===== Stage 6: Domain detectors =====
    let mut skipped_detectors = Vec::new();
    info_span!("detectors").in_scope(|| {
        let start = Instant::now();
        let registry = DetectorRegistry::standard();
        let detections = registry.run(&cleaned, &DetectionContext::new(&config.fields));
        for detection in detections {
            match detection {
                Detection::Detected(candidate) => candidates.push(candidate),
                Detection::InsufficientData {
                    id,
                    title,
                    required_fields,
                } => skipped_detectors.push(SkippedDetector {
                    id,
                    title,
                    required_fields,
                }),
            }
        }
        info!(
            detectors = registry.len(),
            insufficient = skipped_detectors.len(),
            duration_ms = start.elapsed().as_millis(),
            "domain detection complete"
        );
    });
    notify(Stage::Detectors);

    // ===== Stage 7: Score and rank =====
    let patterns = info_span!("scoring").in_scope(|| {
        let start = Instant::now();
        let ranked = score_and_rank(
            &candidates,
            config.max_patterns,
            config.min_confidence,
            config.min_support,
        );
        info!(
            candidates = candidates.len(),
            ranked = ranked.len(),
            duration_ms = start.elapsed().as_millis(),
            "scoring complete"
        );
        ranked
    });
    let scoring = ScoringStatistics::from_ranked(&patterns);
    notify(Stage::Scoring);

    // ===== Stage 8: Validate patterns =====
    let pattern_validation = validate_patterns(&patterns);
    for invalid in &pattern_validation.invalid {
        debug!(pattern = %invalid.pattern.id(), reason = %invalid.reason(), "invalid pattern");
    }
    let validation = ValidationCounts {
        valid_count: pattern_validation.valid_count(),
        invalid_count: pattern_validation.invalid_count(),
    };
    notify(Stage::Validation);

    let overall_confidence_percent = if patterns.is_empty() {
        0.0
    } else {
        patterns.iter().map(|p| p.scores.confidence).sum::<f64>() / patterns.len() as f64 * 100.0
    };
    let processing_time_ms = u64::try_from(run_start.elapsed().as_millis()).unwrap_or(u64::MAX);
    info!(
        records = merged.len(),
        patterns = patterns.len(),
        valid = validation.valid_count,
        invalid = validation.invalid_count,
        duration_ms = processing_time_ms,
        "analysis complete"
    );

    Ok(AnalysisResult {
        analysis_metadata: AnalysisMetadata {
            total_records: merged.len(),
            data_source_count: sources.len(),
            patterns_detected: candidates.len(),
            overall_confidence_percent,
            timestamp: now,
            processing_time_ms,
        },
        statistics: AnalysisStatistics {
            scoring,
            validation,
        },
        patterns,
        skipped_detectors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_positions_are_one_based() {
        let events: Vec<usize> = Stage::ALL
            .iter()
            .map(|stage| StageEvent::completed(*stage).completed)
            .collect();
        assert_eq!(events, (1..=8).collect::<Vec<_>>());
        assert_eq!(Stage::Temporal.to_string(), "temporal");
    }
}
