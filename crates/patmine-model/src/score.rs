//! Pattern scores and ranked output.

use serde::{Deserialize, Serialize};

use crate::pattern::PatternCandidate;

/// Lift above this saturates the lift component.
pub const LIFT_CAP: f64 = 5.0;
/// Conviction above this saturates the conviction component.
pub const CONVICTION_CAP: f64 = 10.0;

/// Multi-factor score of one pattern.
///
/// `lift` and `conviction` are stored raw (finite, non-negative); every other
/// field is already in `[0, 1]`. Use [`PatternScore::components`] for the
/// normalized view that feeds the overall score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternScore {
    pub pattern_id: String,
    pub support: f64,
    pub confidence: f64,
    pub lift: f64,
    pub conviction: f64,
    pub impact: f64,
    /// Numeric complexity score; its contribution to the overall score is inverted.
    pub complexity: f64,
    pub overall_score: f64,
}

/// Normalized `[0, 1]` components of a [`PatternScore`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreComponents {
    pub support: f64,
    pub confidence: f64,
    pub lift: f64,
    pub conviction: f64,
    pub impact: f64,
    pub complexity: f64,
}

impl ScoreComponents {
    pub fn as_array(&self) -> [f64; 6] {
        [
            self.support,
            self.confidence,
            self.lift,
            self.conviction,
            self.impact,
            self.complexity,
        ]
    }
}

impl PatternScore {
    pub fn components(&self) -> ScoreComponents {
        ScoreComponents {
            support: unit(self.support),
            confidence: unit(self.confidence),
            lift: unit(self.lift.min(LIFT_CAP) / LIFT_CAP),
            conviction: unit(self.conviction.min(CONVICTION_CAP) / CONVICTION_CAP),
            impact: unit(self.impact),
            complexity: unit(self.complexity),
        }
    }
}

fn unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// A candidate together with the score that ranked it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedPattern {
    pub pattern: PatternCandidate,
    pub scores: PatternScore,
}

impl RankedPattern {
    pub fn id(&self) -> &str {
        &self.pattern.id
    }

    pub fn overall_score(&self) -> f64 {
        self.scores.overall_score
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn components_saturate_at_caps() {
        let score = PatternScore {
            pattern_id: "p".to_string(),
            support: 0.4,
            confidence: 0.9,
            lift: 12.0,
            conviction: 25.0,
            impact: 0.5,
            complexity: 0.8,
            overall_score: 0.7,
        };
        let components = score.components();
        assert_eq!(components.lift, 1.0);
        assert_eq!(components.conviction, 1.0);
        assert!((components.support - 0.4).abs() < f64::EPSILON);
    }

    #[test]
    fn components_keep_uncapped_ratios() {
        let score = PatternScore {
            pattern_id: "p".to_string(),
            support: 0.2,
            confidence: 0.6,
            lift: 2.5,
            conviction: 4.0,
            impact: 0.3,
            complexity: 0.5,
            overall_score: 0.5,
        };
        let components = score.components();
        assert!((components.lift - 0.5).abs() < 1e-12);
        assert!((components.conviction - 0.4).abs() < 1e-12);
    }
}
