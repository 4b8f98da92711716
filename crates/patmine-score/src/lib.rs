//! Pattern scoring and ranking.
//!
//! Candidates are reduced to six `[0, 1]` components (support, confidence,
//! lift, conviction, impact, complexity) that a fixed weighting folds into one
//! overall score. Ranking filters on confidence and support, then orders by
//! the overall score.

pub mod engine;
pub mod statistics;

pub use engine::{
    PatternScorer, ScoreComponent, ScoreExplanation, ScoreWeights, score_and_rank,
};
pub use statistics::{
    AverageScores, ComplexityDistribution, ScoreDistribution, ScoringStatistics,
};
