pub mod column;
pub mod error;
pub mod ids;
pub mod options;
pub mod pattern;
pub mod record;
pub mod rule;
pub mod score;
pub mod source;
pub mod temporal;
pub mod value;

pub use column::{ColumnType, ColumnTypeInference};
pub use error::{AnalysisError, ModelError, Result};
pub use ids::{SourceName, StableId};
pub use options::{
    AnalysisConfig, CleaningConfig, ComplexityLevel, FieldFallbacks, MiningConfig,
};
pub use pattern::{Complexity, Detection, PatternCandidate, PatternOrigin};
pub use record::{
    MergedRecord, PROVENANCE_FIELDS, Provenance, RESERVED_PREFIX, Record, is_reserved_field,
};
pub use rule::{AssociationRule, Itemset, RuleMetrics, token_field};
pub use score::{CONVICTION_CAP, LIFT_CAP, PatternScore, RankedPattern, ScoreComponents};
pub use source::{DataSource, KindSchema, SourceKind};
pub use temporal::{Granularity, TemporalCategory, TemporalPattern, TimeRange};
pub use value::{DATE_FORMAT, Value, format_number};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn analysis_error_lists_every_violation() {
        let error = AnalysisError::InvalidSources {
            errors: vec![
                "source 1 has an empty name".to_string(),
                "source crm has no records".to_string(),
            ],
        };
        let message = error.to_string();
        assert!(message.contains("- source 1 has an empty name"));
        assert!(message.contains("- source crm has no records"));
        assert_eq!(error.violations().len(), 2);
    }

    #[test]
    fn ranked_pattern_serializes() {
        let ranked = RankedPattern {
            pattern: PatternCandidate::new("p1", "Title", "Description", PatternOrigin::Domain)
                .with_confidence(80.0),
            scores: PatternScore {
                pattern_id: "p1".to_string(),
                support: 0.3,
                confidence: 0.8,
                lift: 2.6,
                conviction: 3.5,
                impact: 0.4,
                complexity: 0.5,
                overall_score: 0.61,
            },
        };
        let json = serde_json::to_string(&ranked).expect("serialize ranked pattern");
        let round: RankedPattern = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(round, ranked);
    }
}
