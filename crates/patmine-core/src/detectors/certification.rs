use patmine_model::{Complexity, Detection, PatternCandidate, PatternOrigin, Record};

use super::{
    DetectionContext, GroupMean, PatternDetector, capped_confidence, profit, relative_percent,
};

const DENSITY_FIELDS: [&str; 2] = ["certification_density", "team_composition"];
/// Densities in this closed range count as a mixed team.
const MIXED_DENSITY: (f64, f64) = (0.4, 0.6);

/// Mixed-certification teams against the rest, compared on profit.
pub struct CertificationDensity;

impl PatternDetector for CertificationDensity {
    fn id(&self) -> &'static str {
        "certification_density"
    }

    fn title(&self) -> &'static str {
        "The Certification Density Paradox"
    }

    fn summary(&self) -> &'static str {
        "Profit of mixed-certification teams (density 0.4-0.6) against all others"
    }

    fn required_fields(&self) -> &'static [&'static str] {
        &["certification_density", "team_composition", "profit_margin"]
    }

    fn detect(&self, records: &[Record], context: &DetectionContext<'_>) -> Detection {
        let mut mixed = Vec::new();
        let mut other = Vec::new();
        let mut density_field = None;
        let mut profit_field = None;
        for record in records {
            let (Some((d_field, density)), Some((p_field, value))) =
                (record.first_number(&DENSITY_FIELDS), profit(record, context))
            else {
                continue;
            };
            density_field.get_or_insert(d_field);
            profit_field.get_or_insert(p_field);
            if (MIXED_DENSITY.0..=MIXED_DENSITY.1).contains(&density) {
                mixed.push(value);
            } else {
                other.push(value);
            }
        }

        let (Some(mixed), Some(other)) = (GroupMean::of(&mixed), GroupMean::of(&other)) else {
            return self.insufficient();
        };
        if !mixed.is_trusted() || !other.is_trusted() {
            return self.insufficient();
        }
        let Some(difference) = relative_percent(mixed.mean, other.mean) else {
            return self.insufficient();
        };

        let sample = mixed.count + other.count;
        let (better, worse) = if difference >= 0.0 {
            ("mixed", "uniformly certified or uncertified")
        } else {
            ("uniformly certified or uncertified", "mixed")
        };
        let variables = [density_field, profit_field].into_iter().flatten();
        Detection::Detected(
            PatternCandidate::new(
                self.id(),
                self.title(),
                format!(
                    "Teams with {better} certification density outperform {worse} teams by \
                     {:.1}% in profit margin across {sample} records.",
                    difference.abs()
                ),
                PatternOrigin::Domain,
            )
            .with_impact(difference.abs())
            .with_confidence(capped_confidence(70.0 + sample as f64 * 2.0))
            .with_complexity(Complexity::VeryHigh)
            .with_variables(variables)
            .with_business_value([
                format!("{:.1}% profit margin difference between team profiles", difference.abs()),
                "Evidence for team composition targets".to_string(),
                "Training budget aimed where it pays".to_string(),
            ])
            .with_implementation_steps([
                "Analyze current team certification distribution",
                "Set certification density targets per project type",
                "Monitor profit margin against team composition",
            ])
            .with_metrics([
                "Certification density per team",
                "Profit margin by density band",
                "Share of projects staffed with mixed teams",
            ]),
        )
    }
}
