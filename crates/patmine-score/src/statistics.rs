//! Aggregate statistics over a ranked pattern list.

use serde::{Deserialize, Serialize};

use patmine_model::{Complexity, RankedPattern};

const EXCELLENT: f64 = 0.8;
const GOOD: f64 = 0.6;
const FAIR: f64 = 0.4;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AverageScores {
    pub support: f64,
    pub confidence: f64,
    pub lift: f64,
    pub conviction: f64,
    pub impact: f64,
    pub overall: f64,
}

/// Counts of patterns per overall-score band.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreDistribution {
    /// At least 0.8.
    pub excellent: usize,
    /// At least 0.6.
    pub good: usize,
    /// At least 0.4.
    pub fair: usize,
    pub poor: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplexityDistribution {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
    pub very_high: usize,
}

/// Summary of a scoring run. All zero for an empty list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoringStatistics {
    pub total_patterns: usize,
    pub average_scores: AverageScores,
    pub score_distribution: ScoreDistribution,
    pub complexity_distribution: ComplexityDistribution,
}

impl ScoringStatistics {
    pub fn from_ranked(patterns: &[RankedPattern]) -> Self {
        if patterns.is_empty() {
            return Self::default();
        }
        let n = patterns.len() as f64;
        let average = |field: fn(&RankedPattern) -> f64| -> f64 {
            patterns.iter().map(field).sum::<f64>() / n
        };
        let average_scores = AverageScores {
            support: average(|p| p.scores.support),
            confidence: average(|p| p.scores.confidence),
            lift: average(|p| p.scores.lift),
            conviction: average(|p| p.scores.conviction),
            impact: average(|p| p.scores.impact),
            overall: average(|p| p.scores.overall_score),
        };

        let mut score_distribution = ScoreDistribution::default();
        let mut complexity_distribution = ComplexityDistribution::default();
        for pattern in patterns {
            let overall = pattern.overall_score();
            let band = if overall >= EXCELLENT {
                &mut score_distribution.excellent
            } else if overall >= GOOD {
                &mut score_distribution.good
            } else if overall >= FAIR {
                &mut score_distribution.fair
            } else {
                &mut score_distribution.poor
            };
            *band += 1;

            let bucket = match pattern.pattern.complexity {
                Complexity::Low => &mut complexity_distribution.low,
                Complexity::Medium => &mut complexity_distribution.medium,
                Complexity::High => &mut complexity_distribution.high,
                Complexity::VeryHigh => &mut complexity_distribution.very_high,
            };
            *bucket += 1;
        }

        Self {
            total_patterns: patterns.len(),
            average_scores,
            score_distribution,
            complexity_distribution,
        }
    }
}
