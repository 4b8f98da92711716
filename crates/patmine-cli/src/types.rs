use std::path::PathBuf;

use patmine_core::AnalysisResult;
use patmine_model::SourceKind;

#[derive(Debug)]
pub struct AnalyzeOutcome {
    pub sources: Vec<SourceSummary>,
    pub result: AnalysisResult,
    pub export: Option<PathBuf>,
}

#[derive(Debug)]
pub struct SourceSummary {
    pub name: String,
    pub kind: SourceKind,
    pub records: usize,
}
