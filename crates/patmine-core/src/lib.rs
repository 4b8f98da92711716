//! Pattern detection and the analysis pipeline.
//!
//! [`analyze`] is the entry point: it takes the caller's data sources and an
//! [`AnalysisConfig`](patmine_model::AnalysisConfig) and returns ranked,
//! scored patterns with run metadata.

#![deny(unsafe_code)]

pub mod detectors;
pub mod pipeline;
pub mod result;

pub use detectors::{DetectionContext, DetectorRegistry, PatternDetector};
pub use pipeline::{Stage, StageEvent, analyze, analyze_with_progress};
pub use result::{
    AnalysisMetadata, AnalysisResult, AnalysisStatistics, SkippedDetector, ValidationCounts,
};
