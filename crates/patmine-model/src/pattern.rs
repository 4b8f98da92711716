//! Candidate patterns prior to scoring.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::rule::RuleMetrics;
use crate::temporal::TemporalCategory;

/// Ordinal implementation complexity of a pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum Complexity {
    Low,
    #[default]
    Medium,
    High,
    #[serde(alias = "Very High")]
    VeryHigh,
}

impl Complexity {
    pub const ALL: [Complexity; 4] = [
        Complexity::Low,
        Complexity::Medium,
        Complexity::High,
        Complexity::VeryHigh,
    ];

    /// Scoring component; inverted by the scorer.
    pub fn score(self) -> f64 {
        match self {
            Self::Low => 0.2,
            Self::Medium => 0.5,
            Self::High => 0.8,
            Self::VeryHigh => 1.0,
        }
    }

    /// Dampener applied to derived support/confidence/impact.
    pub fn factor(self) -> f64 {
        match self {
            Self::Low => 1.2,
            Self::Medium => 1.0,
            Self::High => 0.8,
            Self::VeryHigh => 0.6,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::VeryHigh => "Very High",
        }
    }
}

impl FromStr for Complexity {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let compact: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .collect::<String>()
            .to_lowercase();
        match compact.as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "veryhigh" => Ok(Self::VeryHigh),
            _ => Err(ModelError::UnknownComplexity(s.to_string())),
        }
    }
}

impl fmt::Display for Complexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Which miner produced a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "category", rename_all = "lowercase")]
pub enum PatternOrigin {
    Association,
    Temporal(TemporalCategory),
    Domain,
}

/// A business-framed pattern awaiting scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternCandidate {
    pub id: String,
    pub title: String,
    pub description: String,
    pub origin: PatternOrigin,
    /// Percentage-like impact; unbounded, practically 0-500.
    pub impact: Option<f64>,
    /// Detector confidence on a 0-100 scale.
    pub confidence: Option<f64>,
    pub complexity: Complexity,
    pub variables: Vec<String>,
    pub business_value: Vec<String>,
    pub implementation_steps: Vec<String>,
    pub metrics: Vec<String>,
    /// Raw statistics when the candidate came from the association miner.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_metrics: Option<RuleMetrics>,
}

impl PatternCandidate {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        origin: PatternOrigin,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: description.into(),
            origin,
            impact: None,
            confidence: None,
            complexity: Complexity::default(),
            variables: Vec::new(),
            business_value: Vec::new(),
            implementation_steps: Vec::new(),
            metrics: Vec::new(),
            rule_metrics: None,
        }
    }

    #[must_use]
    pub fn with_impact(mut self, impact_percent: f64) -> Self {
        self.impact = Some(impact_percent);
        self
    }

    #[must_use]
    pub fn with_confidence(mut self, confidence_percent: f64) -> Self {
        self.confidence = Some(confidence_percent);
        self
    }

    #[must_use]
    pub fn with_complexity(mut self, complexity: Complexity) -> Self {
        self.complexity = complexity;
        self
    }

    #[must_use]
    pub fn with_variables<I, S>(mut self, variables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.variables = variables.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_business_value<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.business_value = lines.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_implementation_steps<I, S>(mut self, steps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.implementation_steps = steps.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_metrics<I, S>(mut self, metrics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.metrics = metrics.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_rule_metrics(mut self, metrics: RuleMetrics) -> Self {
        self.rule_metrics = Some(metrics);
        self
    }
}

/// Outcome of a domain detector.
///
/// Insufficient data is a tagged state, never a zero-strength pattern, so the
/// scorer cannot mistake a stub for a weak finding.
#[derive(Debug, Clone, PartialEq)]
pub enum Detection {
    Detected(PatternCandidate),
    InsufficientData {
        id: String,
        title: String,
        required_fields: Vec<String>,
    },
}

impl Detection {
    pub fn insufficient(id: &str, title: &str, required_fields: &[&str]) -> Self {
        Self::InsufficientData {
            id: id.to_string(),
            title: title.to_string(),
            required_fields: required_fields.iter().map(ToString::to_string).collect(),
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Detected(candidate) => &candidate.id,
            Self::InsufficientData { id, .. } => id,
        }
    }

    pub fn is_detected(&self) -> bool {
        matches!(self, Self::Detected(_))
    }

    pub fn candidate(&self) -> Option<&PatternCandidate> {
        match self {
            Self::Detected(candidate) => Some(candidate),
            Self::InsufficientData { .. } => None,
        }
    }

    pub fn into_candidate(self) -> Option<PatternCandidate> {
        match self {
            Self::Detected(candidate) => Some(candidate),
            Self::InsufficientData { .. } => None,
        }
    }

    /// Zero-strength stand-in: id and title kept, zero impact and confidence,
    /// empty lists.
    pub fn placeholder_candidate(&self) -> PatternCandidate {
        match self {
            Self::Detected(candidate) => candidate.clone(),
            Self::InsufficientData { id, title, .. } => PatternCandidate::new(
                id.clone(),
                title.clone(),
                "Insufficient data for this pattern.",
                PatternOrigin::Domain,
            )
            .with_impact(0.0)
            .with_confidence(0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complexity_labels_parse_leniently() {
        assert_eq!("Very High".parse::<Complexity>(), Ok(Complexity::VeryHigh));
        assert_eq!("very_high".parse::<Complexity>(), Ok(Complexity::VeryHigh));
        assert_eq!("LOW".parse::<Complexity>(), Ok(Complexity::Low));
        assert!("extreme".parse::<Complexity>().is_err());
    }

    #[test]
    fn complexity_accepts_spaced_serde_alias() {
        let parsed: Complexity = serde_json::from_str("\"Very High\"").expect("alias");
        assert_eq!(parsed, Complexity::VeryHigh);
        let rendered = serde_json::to_string(&Complexity::VeryHigh).expect("serialize");
        assert_eq!(rendered, "\"VeryHigh\"");
    }

    #[test]
    fn placeholder_has_zero_strength_and_empty_lists() {
        let detection = Detection::insufficient(
            "certification_density",
            "The Certification Density Paradox",
            &["certification_density", "team_composition"],
        );
        assert!(!detection.is_detected());
        let placeholder = detection.placeholder_candidate();
        assert_eq!(placeholder.id, "certification_density");
        assert_eq!(placeholder.impact, Some(0.0));
        assert_eq!(placeholder.confidence, Some(0.0));
        assert!(placeholder.variables.is_empty());
        assert!(placeholder.business_value.is_empty());
        assert!(placeholder.implementation_steps.is_empty());
        assert!(placeholder.metrics.is_empty());
    }
}
