use patmine_model::{Complexity, Detection, PatternCandidate, PatternOrigin, Record, Value};

use super::{DetectionContext, PatternDetector, capped_confidence, label, trusted_groups};

const COMPLEXITY_FIELD: &str = "project_complexity";
const REVENUE_FIELD: &str = "revenue";
/// Highest-to-lowest revenue ratio needed to report the pattern.
const MIN_RATIO: f64 = 2.0;

/// Revenue spread across project complexity levels.
pub struct ComplexityMultiplier;

impl PatternDetector for ComplexityMultiplier {
    fn id(&self) -> &'static str {
        "complexity_multiplier"
    }

    fn title(&self) -> &'static str {
        "The Compound Complexity Multiplier"
    }

    fn summary(&self) -> &'static str {
        "Ratio of the highest to the lowest mean revenue across complexity levels"
    }

    fn required_fields(&self) -> &'static [&'static str] {
        &[COMPLEXITY_FIELD, REVENUE_FIELD]
    }

    fn detect(&self, records: &[Record], _context: &DetectionContext<'_>) -> Detection {
        let groups = trusted_groups(
            records,
            |record| label(record, COMPLEXITY_FIELD),
            |record| record.get(REVENUE_FIELD).and_then(Value::to_number),
        );
        if groups.len() < 2 {
            return self.insufficient();
        }
        let highest = groups
            .iter()
            .max_by(|a, b| a.1.mean.total_cmp(&b.1.mean));
        let lowest = groups
            .iter()
            .min_by(|a, b| a.1.mean.total_cmp(&b.1.mean));
        let (Some((high_level, high)), Some((low_level, low))) = (highest, lowest) else {
            return self.insufficient();
        };
        if high.mean <= 0.0 || low.mean <= 0.0 {
            return self.insufficient();
        }
        let ratio = high.mean / low.mean;
        if ratio <= MIN_RATIO {
            return self.insufficient();
        }

        let sample: usize = groups.values().map(|group| group.count).sum();
        Detection::Detected(
            PatternCandidate::new(
                self.id(),
                self.title(),
                format!(
                    "Projects rated {high_level} bring in {ratio:.1}x the revenue of projects \
                     rated {low_level}; complexity compounds rather than adds."
                ),
                PatternOrigin::Domain,
            )
            .with_impact((ratio - 1.0) * 100.0)
            .with_confidence(capped_confidence(70.0 + sample as f64 * 0.2))
            .with_complexity(Complexity::High)
            .with_variables([COMPLEXITY_FIELD, REVENUE_FIELD])
            .with_business_value([
                format!("{ratio:.1}x revenue spread across complexity levels"),
                "Pricing aligned with delivery complexity".to_string(),
                "Better bid and no-bid decisions".to_string(),
            ])
            .with_implementation_steps([
                "Rate every project's complexity consistently",
                "Price complex work to its revenue potential",
                "Track revenue per complexity level",
            ])
            .with_metrics([
                "Revenue by complexity level",
                "Project mix by complexity",
                "Margin at each complexity level",
            ]),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use patmine_model::FieldFallbacks;

    fn project(level: &str, revenue: f64) -> Record {
        [
            (COMPLEXITY_FIELD, Value::from(level)),
            (REVENUE_FIELD, Value::from(revenue)),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn revenue_ratio_above_two_is_reported() {
        let records = vec![
            project("high", 300.0),
            project("high", 300.0),
            project("low", 100.0),
            project("low", 100.0),
        ];
        let fields = FieldFallbacks::default();
        let detection = ComplexityMultiplier.detect(&records, &DetectionContext::new(&fields));
        let candidate = detection.candidate().expect("detected");
        assert!((candidate.impact.unwrap_or_default() - 200.0).abs() < 1e-9);
        assert!(candidate.description.starts_with("Projects rated high"));
    }

    #[test]
    fn ratio_of_two_is_not_enough() {
        let records = vec![
            project("high", 200.0),
            project("high", 200.0),
            project("low", 100.0),
            project("low", 100.0),
        ];
        let fields = FieldFallbacks::default();
        let detection = ComplexityMultiplier.detect(&records, &DetectionContext::new(&fields));
        assert!(!detection.is_detected());
    }
}
