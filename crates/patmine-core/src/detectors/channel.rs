use patmine_model::{Complexity, Detection, PatternCandidate, PatternOrigin, Record};

use super::{
    DetectionContext, GroupMean, PatternDetector, capped_confidence, label, profit,
    relative_percent, trusted_groups,
};

const CHANNEL_FIELD: &str = "communication_channel";
/// Excess over the overall mean, in percent, the best channel needs.
const MIN_EXCESS: f64 = 15.0;

/// Acquisition channels ranked by the profit of the work they bring in.
pub struct CommunicationHierarchy;

impl PatternDetector for CommunicationHierarchy {
    fn id(&self) -> &'static str {
        "communication_hierarchy"
    }

    fn title(&self) -> &'static str {
        "The Communication Channel Hierarchy"
    }

    fn summary(&self) -> &'static str {
        "Best communication channel by mean profit against the overall mean"
    }

    fn required_fields(&self) -> &'static [&'static str] {
        &[CHANNEL_FIELD, "profit_margin"]
    }

    fn detect(&self, records: &[Record], context: &DetectionContext<'_>) -> Detection {
        let groups = trusted_groups(
            records,
            |record| label(record, CHANNEL_FIELD),
            |record| profit(record, context).map(|(_, value)| value),
        );
        if groups.len() < 2 {
            return self.insufficient();
        }
        let count: usize = groups.values().map(|group| group.count).sum();
        let overall = groups
            .values()
            .map(|group| group.mean * group.count as f64)
            .sum::<f64>()
            / count as f64;
        let by_mean = |a: &&GroupMean, b: &&GroupMean| a.mean.total_cmp(&b.mean);
        let best = groups.iter().max_by(|a, b| by_mean(&a.1, &b.1));
        let worst = groups.iter().min_by(|a, b| by_mean(&a.1, &b.1));
        let (Some((best_channel, best)), Some((worst_channel, worst))) = (best, worst) else {
            return self.insufficient();
        };
        let excess = match relative_percent(best.mean, overall) {
            Some(excess) if excess >= MIN_EXCESS => excess,
            _ => return self.insufficient(),
        };

        let profit_field = records
            .iter()
            .find_map(|record| profit(record, context).map(|(field, _)| field));
        let variables = [Some(CHANNEL_FIELD), profit_field].into_iter().flatten();
        Detection::Detected(
            PatternCandidate::new(
                self.id(),
                self.title(),
                format!(
                    "Work acquired through {best_channel} earns {excess:.1}% more than average, \
                     while {worst_channel} trails with a mean of {:.2} against {:.2} across \
                     {} channels.",
                    worst.mean,
                    best.mean,
                    groups.len()
                ),
                PatternOrigin::Domain,
            )
            .with_impact(excess)
            .with_confidence(capped_confidence(70.0 + groups.len() as f64 * 5.0))
            .with_complexity(Complexity::High)
            .with_variables(variables)
            .with_business_value([
                format!("Focus on {best_channel} for higher-margin work"),
                "Clearer channel investment priorities".to_string(),
                "Earlier warning on low-margin channels".to_string(),
            ])
            .with_implementation_steps([
                "Record the acquisition channel of every project",
                "Shift business development effort toward strong channels",
                "Review channel margins every quarter",
            ])
            .with_metrics([
                "Profit margin by channel",
                "Project count by channel",
                "Channel mix over time",
            ]),
        )
    }
}
