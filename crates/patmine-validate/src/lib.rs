//! Pattern validation.
//!
//! Validation partitions ranked patterns into valid and invalid; nothing is
//! mutated or dropped. Every failed check of an invalid pattern is reported.

use std::fmt;

use serde::Serialize;
use tracing::debug;

use patmine_model::RankedPattern;

pub const MIN_CONFIDENCE: f64 = 0.1;
pub const MIN_SUPPORT: f64 = 0.05;
pub const MIN_OVERALL_SCORE: f64 = 0.3;
/// Above this confidence a lift below 1 is contradictory.
pub const INCONSISTENT_CONFIDENCE: f64 = 0.8;

/// A failed check.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "check", rename_all = "camelCase")]
pub enum PatternIssue {
    MissingId,
    MissingTitle,
    MissingDescription,
    LowConfidence { confidence: f64 },
    LowSupport { support: f64 },
    LowOverallScore { overall_score: f64 },
    /// Lift below 1 alongside high confidence.
    InconsistentMetrics { lift: f64, confidence: f64 },
}

impl fmt::Display for PatternIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingId => f.write_str("missing id"),
            Self::MissingTitle => f.write_str("missing title"),
            Self::MissingDescription => f.write_str("missing description"),
            Self::LowConfidence { confidence } => {
                write!(f, "confidence {confidence:.3} is below {MIN_CONFIDENCE}")
            }
            Self::LowSupport { support } => {
                write!(f, "support {support:.3} is below {MIN_SUPPORT}")
            }
            Self::LowOverallScore { overall_score } => {
                write!(f, "overall score {overall_score:.3} is below {MIN_OVERALL_SCORE}")
            }
            Self::InconsistentMetrics { lift, confidence } => write!(
                f,
                "lift {lift:.3} below 1 contradicts confidence {confidence:.3}"
            ),
        }
    }
}

/// An invalid pattern with every reason it failed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvalidPattern {
    pub pattern: RankedPattern,
    pub issues: Vec<PatternIssue>,
}

impl InvalidPattern {
    /// Issues joined into one human-readable reason.
    pub fn reason(&self) -> String {
        self.issues
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PatternValidation {
    pub valid: Vec<RankedPattern>,
    pub invalid: Vec<InvalidPattern>,
}

impl PatternValidation {
    pub fn valid_count(&self) -> usize {
        self.valid.len()
    }

    pub fn invalid_count(&self) -> usize {
        self.invalid.len()
    }

    pub fn is_clean(&self) -> bool {
        self.invalid.is_empty()
    }
}

/// Every check `pattern` fails, in check order.
pub fn pattern_issues(pattern: &RankedPattern) -> Vec<PatternIssue> {
    let candidate = &pattern.pattern;
    let scores = &pattern.scores;
    let mut issues = Vec::new();
    if candidate.id.trim().is_empty() {
        issues.push(PatternIssue::MissingId);
    }
    if candidate.title.trim().is_empty() {
        issues.push(PatternIssue::MissingTitle);
    }
    if candidate.description.trim().is_empty() {
        issues.push(PatternIssue::MissingDescription);
    }
    if scores.confidence < MIN_CONFIDENCE {
        issues.push(PatternIssue::LowConfidence {
            confidence: scores.confidence,
        });
    }
    if scores.support < MIN_SUPPORT {
        issues.push(PatternIssue::LowSupport {
            support: scores.support,
        });
    }
    if scores.overall_score < MIN_OVERALL_SCORE {
        issues.push(PatternIssue::LowOverallScore {
            overall_score: scores.overall_score,
        });
    }
    if scores.lift < 1.0 && scores.confidence > INCONSISTENT_CONFIDENCE {
        issues.push(PatternIssue::InconsistentMetrics {
            lift: scores.lift,
            confidence: scores.confidence,
        });
    }
    issues
}

/// Partition `patterns` into valid and invalid, preserving order within each.
pub fn validate_patterns(patterns: &[RankedPattern]) -> PatternValidation {
    let mut validation = PatternValidation::default();
    for pattern in patterns {
        let issues = pattern_issues(pattern);
        if issues.is_empty() {
            validation.valid.push(pattern.clone());
        } else {
            debug!(pattern = %pattern.id(), issues = issues.len(), "pattern failed validation");
            validation.invalid.push(InvalidPattern {
                pattern: pattern.clone(),
                issues,
            });
        }
    }
    validation
}
