use patmine_model::{Complexity, Detection, PatternCandidate, PatternOrigin, Record, Value};

use super::{
    DetectionContext, GroupMean, PatternDetector, capped_confidence, flag, profit,
    relative_percent,
};

const MATCH_FIELD: &str = "industry_match";
const DURATION_FIELD: &str = "duration_months";
/// Only projects at least this long are compared.
const LONG_PROJECT_MONTHS: f64 = 8.0;
/// Relative profit uplift, in percent, needed to report the pattern.
const MIN_UPLIFT: f64 = 50.0;

/// Industry-matched teams on long projects against unmatched teams.
pub struct IndustryExperience;

impl PatternDetector for IndustryExperience {
    fn id(&self) -> &'static str {
        "industry_experience"
    }

    fn title(&self) -> &'static str {
        "The Industry Experience Amplification Effect"
    }

    fn summary(&self) -> &'static str {
        "Profit uplift of industry-matched teams on projects of 8 months or more"
    }

    fn required_fields(&self) -> &'static [&'static str] {
        &[MATCH_FIELD, DURATION_FIELD, "profit_margin"]
    }

    fn detect(&self, records: &[Record], context: &DetectionContext<'_>) -> Detection {
        let mut matched = Vec::new();
        let mut unmatched = Vec::new();
        let mut profit_field = None;
        for record in records {
            let duration = record.get(DURATION_FIELD).and_then(Value::to_number);
            if !duration.is_some_and(|months| months >= LONG_PROJECT_MONTHS) {
                continue;
            }
            let Some(is_match) = record.get_present(MATCH_FIELD).and_then(flag) else {
                continue;
            };
            let Some((field, value)) = profit(record, context) else {
                continue;
            };
            profit_field.get_or_insert(field);
            if is_match {
                matched.push(value);
            } else {
                unmatched.push(value);
            }
        }

        let (Some(matched), Some(unmatched)) = (GroupMean::of(&matched), GroupMean::of(&unmatched))
        else {
            return self.insufficient();
        };
        if !matched.is_trusted() || !unmatched.is_trusted() {
            return self.insufficient();
        }
        let uplift = match relative_percent(matched.mean, unmatched.mean) {
            Some(uplift) if uplift > MIN_UPLIFT => uplift,
            _ => return self.insufficient(),
        };

        let long_projects = matched.count + unmatched.count;
        let variables = [Some(MATCH_FIELD), Some(DURATION_FIELD), profit_field]
            .into_iter()
            .flatten();
        Detection::Detected(
            PatternCandidate::new(
                self.id(),
                self.title(),
                format!(
                    "Teams with matching industry experience achieve {uplift:.0}% higher profit \
                     margins than generic teams, but only on projects of {LONG_PROJECT_MONTHS:.0} \
                     months or more ({long_projects} projects)."
                ),
                PatternOrigin::Domain,
            )
            .with_impact(uplift)
            .with_confidence(capped_confidence(75.0 + long_projects as f64))
            .with_complexity(Complexity::VeryHigh)
            .with_variables(variables)
            .with_business_value([
                format!("{uplift:.0}% margin uplift on long engagements"),
                "Staffing rules grounded in measured outcomes".to_string(),
                "Stronger positioning in familiar industries".to_string(),
            ])
            .with_implementation_steps([
                "Tag team members with their industry experience",
                "Prefer matched teams for long engagements",
                "Compare margins of matched and generic teams each quarter",
            ])
            .with_metrics([
                "Share of long projects with matched teams",
                "Profit margin by industry match",
                "Project duration by team profile",
            ]),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use patmine_model::FieldFallbacks;

    fn project(matched: &str, months: f64, margin: f64) -> Record {
        [
            (MATCH_FIELD, Value::from(matched)),
            (DURATION_FIELD, Value::from(months)),
            ("profit_margin", Value::from(margin)),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn matched_long_projects_amplify_profit() {
        let records = vec![
            project("yes", 10.0, 0.30),
            project("true", 12.0, 0.30),
            project("no", 9.0, 0.10),
            project("no", 8.0, 0.10),
            // short projects are ignored
            project("no", 3.0, 0.90),
        ];
        let fields = FieldFallbacks::default();
        let detection = IndustryExperience.detect(&records, &DetectionContext::new(&fields));
        let candidate = detection.candidate().expect("detected");
        assert!((candidate.impact.unwrap_or_default() - 200.0).abs() < 1e-9);
        assert_eq!(candidate.confidence, Some(79.0));
    }

    #[test]
    fn modest_uplift_is_not_reported() {
        let records = vec![
            project("yes", 10.0, 0.12),
            project("yes", 12.0, 0.12),
            project("no", 9.0, 0.10),
            project("no", 8.0, 0.10),
        ];
        let fields = FieldFallbacks::default();
        let detection = IndustryExperience.detect(&records, &DetectionContext::new(&fields));
        assert!(!detection.is_detected());
    }
}
