//! Per-candidate score derivation and ranking.

use tracing::debug;

use patmine_model::{
    CONVICTION_CAP, Complexity, PatternCandidate, PatternScore, RankedPattern, ScoreComponents,
};

/// Support assumed for a candidate without mined statistics, before dampening.
const BASE_SUPPORT: f64 = 0.3;
/// Confidence assumed for a candidate without a stated confidence, before dampening.
const BASE_CONFIDENCE: f64 = 0.7;
/// Impact assumed for a candidate without a stated impact, before dampening.
const BASE_IMPACT: f64 = 0.5;
/// Variable count at which derived impact saturates.
const IMPACT_VARIABLE_SATURATION: f64 = 5.0;

/// Weights of the overall score. They sum to 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreWeights {
    pub support: f64,
    pub confidence: f64,
    pub lift: f64,
    pub conviction: f64,
    pub impact: f64,
    /// Applied to `1 - complexity`.
    pub simplicity: f64,
}

impl ScoreWeights {
    pub const STANDARD: ScoreWeights = ScoreWeights {
        support: 0.15,
        confidence: 0.25,
        lift: 0.20,
        conviction: 0.10,
        impact: 0.25,
        simplicity: 0.05,
    };

    /// Weighted sum of normalized components, clamped to `[0, 1]`.
    pub fn combine(&self, components: &ScoreComponents) -> f64 {
        let sum = self.support * components.support
            + self.confidence * components.confidence
            + self.lift * components.lift
            + self.conviction * components.conviction
            + self.impact * components.impact
            + self.simplicity * (1.0 - components.complexity);
        unit(sum)
    }
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// A component contributing to the overall score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreComponent {
    pub name: &'static str,
    /// Normalized value in `[0, 1]`.
    pub value: f64,
    pub weight: f64,
    pub description: String,
}

/// Breakdown of a score for explainability.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreExplanation {
    pub pattern_id: String,
    pub components: Vec<ScoreComponent>,
    pub overall_score: f64,
}

impl ScoreExplanation {
    /// Human-readable one-line explanation of the score.
    pub fn explain(&self) -> String {
        self.components
            .iter()
            .map(|c| format!("{}: {:.0}%", c.name, c.value * 100.0))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// Scores candidates against a fixed weighting.
#[derive(Debug, Clone, Default)]
pub struct PatternScorer {
    weights: ScoreWeights,
}

impl PatternScorer {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_weights(mut self, weights: ScoreWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn weights(&self) -> &ScoreWeights {
        &self.weights
    }

    /// Score one candidate.
    ///
    /// Association candidates keep their mined support, confidence, lift and
    /// conviction. Every other candidate gets derived statistics dampened by
    /// its complexity factor. A missing conviction (confidence of 1) saturates
    /// at the conviction cap.
    pub fn score(&self, candidate: &PatternCandidate) -> PatternScore {
        let complexity = candidate.complexity;
        let impact = impact_of(candidate);
        let (support, confidence, lift, conviction) = match candidate.rule_metrics {
            Some(metrics) => (
                unit(metrics.support),
                unit(metrics.confidence),
                non_negative(metrics.lift),
                metrics.conviction.map_or(CONVICTION_CAP, non_negative),
            ),
            None => {
                let support = derived_support(complexity, candidate.variables.len());
                let confidence = match finite(candidate.confidence) {
                    Some(percent) => unit(percent / 100.0),
                    None => unit(BASE_CONFIDENCE * impact * complexity.factor()),
                };
                (
                    support,
                    confidence,
                    derived_lift(support, confidence),
                    derived_conviction(support, confidence),
                )
            }
        };

        let mut score = PatternScore {
            pattern_id: candidate.id.clone(),
            support,
            confidence,
            lift,
            conviction,
            impact,
            complexity: complexity.score(),
            overall_score: 0.0,
        };
        score.overall_score = self.weights.combine(&score.components());
        score
    }

    /// Score `candidate` and break the result down per component.
    pub fn explain(&self, candidate: &PatternCandidate) -> ScoreExplanation {
        let score = self.score(candidate);
        let c = score.components();
        let w = &self.weights;
        let components = vec![
            ScoreComponent {
                name: "Support",
                value: c.support,
                weight: w.support,
                description: format!("{:.1}% of transactions", score.support * 100.0),
            },
            ScoreComponent {
                name: "Confidence",
                value: c.confidence,
                weight: w.confidence,
                description: format!("{:.1}% conditional likelihood", score.confidence * 100.0),
            },
            ScoreComponent {
                name: "Lift",
                value: c.lift,
                weight: w.lift,
                description: format!("{:.2}x independence", score.lift),
            },
            ScoreComponent {
                name: "Conviction",
                value: c.conviction,
                weight: w.conviction,
                description: format!("{:.2}", score.conviction),
            },
            ScoreComponent {
                name: "Impact",
                value: c.impact,
                weight: w.impact,
                description: format!("{:.1}% business impact", score.impact * 100.0),
            },
            ScoreComponent {
                name: "Simplicity",
                value: 1.0 - c.complexity,
                weight: w.simplicity,
                description: format!("{} complexity", candidate.complexity),
            },
        ];
        ScoreExplanation {
            pattern_id: score.pattern_id,
            components,
            overall_score: score.overall_score,
        }
    }

    /// Score, filter and rank.
    ///
    /// Candidates whose confidence or support falls below the thresholds are
    /// dropped; the rest are ordered by overall score, highest first, ties in
    /// input order, and truncated to `max_results`.
    pub fn rank(
        &self,
        candidates: &[PatternCandidate],
        max_results: usize,
        min_confidence: f64,
        min_support: f64,
    ) -> Vec<RankedPattern> {
        let mut ranked: Vec<RankedPattern> = candidates
            .iter()
            .map(|candidate| RankedPattern {
                scores: self.score(candidate),
                pattern: candidate.clone(),
            })
            .filter(|ranked| {
                ranked.scores.confidence >= min_confidence && ranked.scores.support >= min_support
            })
            .collect();
        let retained = ranked.len();
        ranked.sort_by(|a, b| b.scores.overall_score.total_cmp(&a.scores.overall_score));
        ranked.truncate(max_results);
        debug!(
            candidates = candidates.len(),
            retained,
            ranked = ranked.len(),
            "ranked patterns"
        );
        ranked
    }
}

/// Rank `candidates` with the standard weights.
pub fn score_and_rank(
    candidates: &[PatternCandidate],
    max_results: usize,
    min_confidence: f64,
    min_support: f64,
) -> Vec<RankedPattern> {
    PatternScorer::new().rank(candidates, max_results, min_confidence, min_support)
}

fn impact_of(candidate: &PatternCandidate) -> f64 {
    match finite(candidate.impact) {
        Some(percent) => unit(percent / 100.0),
        None => {
            let coverage = (candidate.variables.len() as f64 / IMPACT_VARIABLE_SATURATION).min(1.0);
            unit(BASE_IMPACT * coverage * candidate.complexity.factor())
        }
    }
}

fn derived_support(complexity: Complexity, variable_count: usize) -> f64 {
    let variable_factor = (1.0 - 0.1 * variable_count as f64).max(0.1);
    unit(BASE_SUPPORT * complexity.factor() * variable_factor)
}

fn derived_lift(support: f64, confidence: f64) -> f64 {
    if support == 0.0 { 1.0 } else { confidence / support }
}

fn derived_conviction(support: f64, confidence: f64) -> f64 {
    if confidence >= 1.0 {
        1.0
    } else {
        non_negative((1.0 - support) / (1.0 - confidence))
    }
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

fn unit(value: f64) -> f64 {
    if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) }
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() { value.max(0.0) } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use patmine_model::{PatternOrigin, RuleMetrics};

    fn domain(id: &str) -> PatternCandidate {
        PatternCandidate::new(id, "Title", "Description", PatternOrigin::Domain)
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn derived_scores_follow_the_formulas() {
        let candidate = domain("p")
            .with_confidence(80.0)
            .with_impact(40.0)
            .with_complexity(Complexity::High)
            .with_variables(["a", "b"]);
        let score = PatternScorer::new().score(&candidate);
        // 0.3 * 0.8 * (1 - 0.2)
        assert!(close(score.support, 0.192));
        assert!(close(score.confidence, 0.8));
        assert!(close(score.lift, 0.8 / 0.192));
        assert!(close(score.conviction, (1.0 - 0.192) / 0.2));
        assert!(close(score.impact, 0.4));
        assert!(close(score.complexity, 0.8));

        let expected = 0.15 * 0.192
            + 0.25 * 0.8
            + 0.20 * (0.8 / 0.192 / 5.0)
            + 0.10 * ((1.0 - 0.192) / 0.2 / 10.0)
            + 0.25 * 0.4
            + 0.05 * 0.2;
        assert!(close(score.overall_score, expected));
    }

    #[test]
    fn missing_confidence_and_impact_are_derived() {
        let candidate = domain("p")
            .with_complexity(Complexity::Low)
            .with_variables(["a", "b", "c", "d", "e", "f"]);
        let score = PatternScorer::new().score(&candidate);
        // 0.5 * min(1, 6/5) * 1.2, clamped
        assert!(close(score.impact, 0.6));
        // 0.7 * 0.6 * 1.2
        assert!(close(score.confidence, 0.504));
        // variable factor 0.4
        assert!(close(score.support, 0.3 * 1.2 * 0.4));
    }

    #[test]
    fn rule_metrics_are_used_raw() {
        let candidate = domain("rule").with_impact(95.0).with_rule_metrics(RuleMetrics {
            support: 0.5,
            confidence: 1.0,
            lift: 1.6,
            conviction: None,
        });
        let score = PatternScorer::new().score(&candidate);
        assert_eq!(score.support, 0.5);
        assert_eq!(score.confidence, 1.0);
        assert_eq!(score.lift, 1.6);
        assert_eq!(score.conviction, CONVICTION_CAP);
        assert_eq!(score.components().conviction, 1.0);
    }

    #[test]
    fn impact_above_one_hundred_percent_is_clamped() {
        let score = PatternScorer::new().score(&domain("p").with_impact(480.0));
        assert_eq!(score.impact, 1.0);
    }

    #[test]
    fn zero_strength_candidates_are_filtered_out() {
        let placeholder = domain("stub").with_confidence(0.0).with_impact(0.0);
        let strong = domain("strong").with_confidence(90.0).with_impact(60.0);
        let ranked = score_and_rank(&[placeholder, strong], 8, 0.6, 0.1);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].id(), "strong");
    }

    #[test]
    fn ranking_orders_and_truncates() {
        let candidates: Vec<PatternCandidate> = [60.0, 95.0, 75.0, 85.0]
            .into_iter()
            .enumerate()
            .map(|(i, confidence)| {
                domain(&format!("p{i}"))
                    .with_confidence(confidence)
                    .with_impact(50.0)
            })
            .collect();
        let ranked = score_and_rank(&candidates, 3, 0.0, 0.0);
        let ids: Vec<&str> = ranked.iter().map(RankedPattern::id).collect();
        assert_eq!(ids, vec!["p1", "p3", "p2"]);
    }

    #[test]
    fn explanation_lists_every_component() {
        let candidate = domain("p").with_confidence(70.0).with_impact(30.0);
        let explanation = PatternScorer::new().explain(&candidate);
        assert_eq!(explanation.components.len(), 6);
        let weight_sum: f64 = explanation.components.iter().map(|c| c.weight).sum();
        assert!(close(weight_sum, 1.0));
        let recombined: f64 = explanation
            .components
            .iter()
            .map(|c| c.value * c.weight)
            .sum();
        assert!(close(recombined.min(1.0), explanation.overall_score));
        assert!(explanation.explain().starts_with("Support: "));
    }
}
