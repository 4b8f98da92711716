use chrono::Datelike;

use patmine_model::{Complexity, Detection, PatternCandidate, PatternOrigin, Record};
use patmine_transform::value_to_date;

use super::{
    DetectionContext, GroupMean, PatternDetector, capped_confidence, label, profit,
    relative_percent,
};

/// Submissions on or after this day of the month count as late in the period.
const LATE_DAY: u32 = 15;
const STATUS_FIELD: &str = "status";
const SUBMISSION_DATE_FIELD: &str = "submission_date";
const WINNING_STATUSES: [&str; 2] = ["won", "success"];

/// Late-month submissions against early ones, on win rate and profit.
pub struct QuarterEndTiming;

#[derive(Default)]
struct Half {
    wins: Vec<f64>,
    profits: Vec<f64>,
}

impl PatternDetector for QuarterEndTiming {
    fn id(&self) -> &'static str {
        "quarter_end_timing"
    }

    fn title(&self) -> &'static str {
        "The Quarter-End Timing Trap"
    }

    fn summary(&self) -> &'static str {
        "Win rate and profit of submissions made late in the month against early ones"
    }

    fn required_fields(&self) -> &'static [&'static str] {
        &[SUBMISSION_DATE_FIELD, STATUS_FIELD, "profit_margin"]
    }

    fn detect(&self, records: &[Record], context: &DetectionContext<'_>) -> Detection {
        // Submission date first, then the general date chain.
        let mut date_fields = vec![SUBMISSION_DATE_FIELD];
        date_fields.extend(
            context
                .fields
                .date_fields()
                .into_iter()
                .filter(|field| *field != SUBMISSION_DATE_FIELD),
        );
        let mut early = Half::default();
        let mut late = Half::default();
        let mut date_field = None;
        let mut profit_field = None;
        for record in records {
            let Some((field, date)) = record
                .first_present(&date_fields)
                .and_then(|(field, value)| value_to_date(value).map(|date| (field, date)))
            else {
                continue;
            };
            date_field.get_or_insert(field);
            let half = if date.day() >= LATE_DAY { &mut late } else { &mut early };
            if let Some(status) = label(record, STATUS_FIELD) {
                let won = WINNING_STATUSES.contains(&status.as_str());
                half.wins.push(if won { 1.0 } else { 0.0 });
            }
            if let Some((field, value)) = profit(record, context) {
                profit_field.get_or_insert(field);
                half.profits.push(value);
            }
        }

        let trusted = |values: &[f64]| GroupMean::of(values).filter(GroupMean::is_trusted);
        let win_delta = trusted(&late.wins)
            .zip(trusted(&early.wins))
            .map(|(late, early)| (late.mean - early.mean) * 100.0);
        let margin_delta = trusted(&late.profits)
            .zip(trusted(&early.profits))
            .and_then(|(late, early)| relative_percent(late.mean, early.mean));
        if win_delta.is_none() && margin_delta.is_none() {
            return self.insufficient();
        }

        let sample = late.wins.len().max(late.profits.len()) + early.wins.len().max(early.profits.len());
        let impact = win_delta
            .unwrap_or(0.0)
            .abs()
            .max(margin_delta.unwrap_or(0.0).abs());
        let mut findings = Vec::new();
        if let Some(delta) = win_delta {
            findings.push(format!(
                "a win rate {:.1} points {}",
                delta.abs(),
                if delta >= 0.0 { "higher" } else { "lower" }
            ));
        }
        if let Some(delta) = margin_delta {
            findings.push(format!(
                "profit margins {:.1}% {}",
                delta.abs(),
                if delta >= 0.0 { "higher" } else { "lower" }
            ));
        }
        let mut variables: Vec<&str> = date_field.into_iter().collect();
        if win_delta.is_some() {
            variables.push(STATUS_FIELD);
        }
        if margin_delta.is_some() {
            variables.extend(profit_field);
        }

        Detection::Detected(
            PatternCandidate::new(
                self.id(),
                self.title(),
                format!(
                    "Submissions made from day {LATE_DAY} of the month onward show {} than \
                     earlier submissions.",
                    findings.join(" and ")
                ),
                PatternOrigin::Domain,
            )
            .with_impact(impact)
            .with_confidence(capped_confidence(80.0 + sample as f64 * 0.1))
            .with_complexity(Complexity::High)
            .with_variables(variables)
            .with_business_value([
                "Pricing discipline during period-end rushes",
                "Fewer commitments made under sales pressure",
                "Steadier margins across the quarter",
            ])
            .with_implementation_steps([
                "Analyze submission timing against outcomes",
                "Add review gates for late-period submissions",
                "Track margins of late-period wins",
            ])
            .with_metrics([
                "Win rate by submission half-month",
                "Profit margin of late-period wins",
                "Share of submissions made late in the period",
            ]),
        )
    }
}
