use std::io::{self, IsTerminal};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, info_span};

use patmine_cli::config::resolve_config;
use patmine_core::{DetectorRegistry, Stage, StageEvent, analyze_with_progress};
use patmine_ingest::{load_source, load_sources};
use patmine_model::ColumnTypeInference;
use patmine_report::write_pattern_export;
use patmine_transform::detect_column_types;

use crate::cli::{AnalyzeArgs, ColumnsArgs};
use crate::types::{AnalyzeOutcome, SourceSummary};

const SPINNER_TEMPLATE: &str = "{spinner:.cyan} [{pos}/{len}] {msg} ({elapsed})";

pub fn run_analyze(args: &AnalyzeArgs) -> Result<AnalyzeOutcome> {
    let run_span = info_span!("analyze", files = args.files.len());
    let _run_guard = run_span.enter();
    let start = Instant::now();

    // ===== Stage 0: Resolve configuration =====
    let config = resolve_config(args.config.as_deref(), args.overrides())?;

    // ===== Stage 1: Load sources =====
    let sources = load_sources(&args.files).context("load sources")?;
    let summaries = sources
        .iter()
        .map(|source| SourceSummary {
            name: source.name.clone(),
            kind: source.kind,
            records: source.len(),
        })
        .collect();

    // ===== Stage 2: Analyze =====
    let progress = stage_progress(!args.json);
    let result = analyze_with_progress(&sources, &config, |event: StageEvent| {
        progress.set_position(event.completed as u64);
        progress.set_message(event.stage.as_str());
    });
    progress.finish_and_clear();
    let result = result.context("analysis failed")?;

    // ===== Stage 3: Export =====
    if let Some(path) = &args.export {
        write_pattern_export(path, &result.patterns)?;
    }

    info!(
        patterns = result.patterns.len(),
        skipped_detectors = result.skipped_detectors.len(),
        duration_ms = start.elapsed().as_millis(),
        "analysis complete"
    );
    Ok(AnalyzeOutcome {
        sources: summaries,
        result,
        export: args.export.clone(),
    })
}

/// Stage counter on stderr. Hidden when stderr is not a terminal.
fn stage_progress(visible: bool) -> ProgressBar {
    if !visible || !io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let style = ProgressStyle::with_template(SPINNER_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    let bar = ProgressBar::new(Stage::ALL.len() as u64).with_style(style);
    bar.set_message("starting");
    bar.enable_steady_tick(Duration::from_millis(120));
    bar
}

pub fn run_columns(args: &ColumnsArgs) -> Result<(String, Vec<ColumnTypeInference>)> {
    let source = load_source(&args.file)?;
    let inferences = detect_column_types(&source.records);
    Ok((source.name, inferences))
}

/// Detector catalog in run order.
pub fn detector_catalog() -> Vec<(&'static str, &'static str, String)> {
    DetectorRegistry::standard()
        .iter()
        .map(|detector| {
            (
                detector.id(),
                detector.title(),
                detector.required_fields().join(", "),
            )
        })
        .collect()
}
