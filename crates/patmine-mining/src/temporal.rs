//! Seasonal, trend, cyclic and anomaly detection over dated values.
//!
//! Each record contributes one observation: the first present field of the
//! date fallback chain paired with the first present field of the value
//! chain. Records missing either, or whose chosen fields do not parse as a
//! date and a number, are skipped.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDateTime};
use tracing::debug;

use patmine_model::{
    Complexity, FieldFallbacks, Granularity, PatternCandidate, PatternOrigin, Record,
    TemporalCategory, TemporalPattern, TimeRange,
};
use patmine_transform::{DateParts, value_to_date};

use crate::refine::title_case;

/// Confidence ceiling shared by every temporal detector.
pub const MAX_TEMPORAL_CONFIDENCE: f64 = 95.0;

const MONTHLY_EXCESS: f64 = 0.20;
const QUARTERLY_EXCESS: f64 = 0.15;
const WEEKDAY_EXCESS: f64 = 0.10;
const TREND_THRESHOLD: f64 = 0.1;
const MIN_ANOMALY_POINTS: usize = 10;
const ANOMALY_SIGMAS: f64 = 2.0;

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];
const WEEKDAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// One dated value.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub date: NaiveDateTime,
    pub value: f64,
    pub date_field: String,
    pub value_field: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemporalMiner {
    fields: FieldFallbacks,
}

impl TemporalMiner {
    pub fn new(fields: FieldFallbacks) -> Self {
        Self { fields }
    }

    /// Dated values in chronological order; ties keep record order.
    pub fn observations<R: AsRef<Record>>(&self, records: &[R]) -> Vec<Observation> {
        let date_fields = self.fields.date_fields();
        let value_fields = self.fields.value_fields();
        let mut observations: Vec<Observation> = records
            .iter()
            .filter_map(|record| {
                let record = record.as_ref();
                let (date_field, raw_date) = record.first_present(&date_fields)?;
                let date = value_to_date(raw_date)?;
                let (value_field, raw_value) = record.first_present(&value_fields)?;
                let value = raw_value.to_number()?;
                Some(Observation {
                    date,
                    value,
                    date_field: date_field.to_string(),
                    value_field: value_field.to_string(),
                })
            })
            .collect();
        observations.sort_by_key(|observation| observation.date);
        observations
    }

    pub fn mine<R: AsRef<Record>>(&self, records: &[R]) -> Vec<TemporalPattern> {
        let observations = self.observations(records);
        if observations.is_empty() {
            debug!("no dated values; temporal mining skipped");
            return Vec::new();
        }
        let mut patterns = seasonal_patterns(&observations);
        patterns.extend(trend_pattern(&observations));
        patterns.extend(cyclic_pattern(&observations));
        patterns.extend(anomaly_patterns(&observations));
        debug!(
            observations = observations.len(),
            patterns = patterns.len(),
            "mined temporal patterns"
        );
        patterns
    }
}

fn mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), value| (sum + value, count + 1));
    (count > 0).then(|| sum / count as f64)
}

fn capped(confidence: f64) -> f64 {
    confidence.min(MAX_TEMPORAL_CONFIDENCE)
}

/// Relative excess of `value` over `baseline` as a percentage; 0 for a zero baseline.
fn excess_percent(value: f64, baseline: f64) -> f64 {
    if baseline == 0.0 {
        0.0
    } else {
        (value - baseline) / baseline.abs() * 100.0
    }
}

fn time_range(observations: &[Observation], granularity: Granularity) -> Option<TimeRange> {
    Some(TimeRange {
        start: observations.first()?.date,
        end: observations.last()?.date,
        granularity,
    })
}

/// Distinct date then value fields the observations were drawn from.
fn variables(observations: &[Observation]) -> Vec<String> {
    let mut fields: Vec<String> = Vec::new();
    let names = observations
        .iter()
        .map(|o| &o.date_field)
        .chain(observations.iter().map(|o| &o.value_field));
    for name in names {
        if !fields.contains(name) {
            fields.push(name.clone());
        }
    }
    fields
}

fn value_label(observations: &[Observation]) -> String {
    observations
        .first()
        .map_or_else(|| "Value".to_string(), |o| title_case(&o.value_field))
}

/// Buckets whose mean exceeds the overall mean by more than `excess` of it.
fn qualifying_buckets<F>(observations: &[Observation], excess: f64, key: F) -> Vec<(u32, f64)>
where
    F: Fn(&Observation) -> u32,
{
    let Some(overall) = mean(observations.iter().map(|o| o.value)) else {
        return Vec::new();
    };
    let mut buckets: BTreeMap<u32, Vec<f64>> = BTreeMap::new();
    for observation in observations {
        buckets.entry(key(observation)).or_default().push(observation.value);
    }
    buckets
        .into_iter()
        .filter_map(|(bucket, values)| mean(values).map(|m| (bucket, m)))
        .filter(|(_, bucket_mean)| bucket_mean - overall > excess * overall.abs())
        .collect()
}

/// Monthly and quarterly seasonality: at most one pattern per granularity.
pub fn seasonal_patterns(observations: &[Observation]) -> Vec<TemporalPattern> {
    let Some(overall) = mean(observations.iter().map(|o| o.value)) else {
        return Vec::new();
    };
    let groupings: [(Granularity, f64, fn(&Observation) -> u32, fn(u32) -> String); 2] = [
        (
            Granularity::Month,
            MONTHLY_EXCESS,
            |o| o.date.month0(),
            |bucket| MONTH_NAMES[bucket as usize % 12].to_string(),
        ),
        (
            Granularity::Quarter,
            QUARTERLY_EXCESS,
            |o| DateParts::of(o.date).quarter,
            |bucket| format!("Q{bucket}"),
        ),
    ];

    let label = value_label(observations);
    let mut patterns = Vec::new();
    for (granularity, excess, key, name) in groupings {
        let qualifying = qualifying_buckets(observations, excess, key);
        if qualifying.is_empty() {
            continue;
        }
        let Some(range) = time_range(observations, granularity) else {
            continue;
        };
        let peak = qualifying
            .iter()
            .map(|(_, bucket_mean)| *bucket_mean)
            .fold(f64::NEG_INFINITY, f64::max);
        let names: Vec<String> = qualifying.iter().map(|(bucket, _)| name(*bucket)).collect();
        let (id, period) = match granularity {
            Granularity::Quarter => ("temporal-seasonal-quarterly", "quarterly"),
            _ => ("temporal-seasonal-monthly", "monthly"),
        };
        let bucket_count = qualifying.len() as f64;
        patterns.push(TemporalPattern {
            id: id.to_string(),
            title: format!("{} {label} Seasonality", title_case(period)),
            description: format!(
                "{label} peaks in {} with averages up to {:.1}% above the overall mean.",
                names.join(", "),
                excess_percent(peak, overall)
            ),
            category: TemporalCategory::Seasonal,
            confidence: capped(70.0 + (bucket_count / 4.0).min(1.0) * 20.0),
            impact: excess_percent(peak, overall),
            time_range: range,
            variables: variables(observations),
        });
    }
    patterns
}

/// Least-squares slope of value against chronological index over positive
/// values, reported relative to their mean.
pub fn trend_pattern(observations: &[Observation]) -> Option<TemporalPattern> {
    let positive: Vec<&Observation> = observations.iter().filter(|o| o.value > 0.0).collect();
    let n = positive.len();
    let mean_y = mean(positive.iter().map(|o| o.value))?;
    let mean_x = (n - 1) as f64 / 2.0;
    let (sxy, sxx) = positive
        .iter()
        .enumerate()
        .fold((0.0, 0.0), |(sxy, sxx), (index, o)| {
            let dx = index as f64 - mean_x;
            (sxy + dx * (o.value - mean_y), sxx + dx * dx)
        });
    if sxx == 0.0 || mean_y == 0.0 {
        return None;
    }
    let normalized = (sxy / sxx) / mean_y;
    if normalized.abs() <= TREND_THRESHOLD {
        return None;
    }
    let label = value_label(observations);
    let direction = if normalized > 0.0 { "Upward" } else { "Downward" };
    let owned: Vec<Observation> = positive.into_iter().cloned().collect();
    Some(TemporalPattern {
        id: format!("temporal-trend-{}", direction.to_lowercase()),
        title: format!("{direction} {label} Trend"),
        description: format!(
            "{label} moves by {:.1}% of its mean per dated record across {n} records.",
            normalized * 100.0
        ),
        category: TemporalCategory::Trend,
        confidence: capped(75.0 + (n as f64 / 50.0).min(1.0) * 20.0),
        impact: normalized.abs() * 100.0,
        time_range: time_range(&owned, Granularity::Day)?,
        variables: variables(&owned),
    })
}

/// Weekly cycle: weekdays whose mean exceeds the overall mean by more than 10 %.
pub fn cyclic_pattern(observations: &[Observation]) -> Option<TemporalPattern> {
    let qualifying = qualifying_buckets(observations, WEEKDAY_EXCESS, |o| {
        DateParts::of(o.date).day_of_week
    });
    if qualifying.is_empty() {
        return None;
    }
    let overall = mean(observations.iter().map(|o| o.value))?;
    let peak = qualifying
        .iter()
        .map(|(_, day_mean)| *day_mean)
        .fold(f64::NEG_INFINITY, f64::max);
    let days: Vec<&str> = qualifying
        .iter()
        .map(|(day, _)| WEEKDAY_NAMES[*day as usize % 7])
        .collect();
    let label = value_label(observations);
    let n = observations.len() as f64;
    Some(TemporalPattern {
        id: "temporal-cyclic-weekly".to_string(),
        title: format!("Weekly {label} Cycle"),
        description: format!(
            "{label} runs up to {:.1}% above average on {}.",
            excess_percent(peak, overall),
            days.join(", ")
        ),
        category: TemporalCategory::Cyclic,
        confidence: capped(80.0 + (n / 100.0).min(1.0) * 15.0),
        impact: excess_percent(peak, overall),
        time_range: time_range(observations, Granularity::Week)?,
        variables: variables(observations),
    })
}

/// Points more than two population standard deviations from the mean.
pub fn anomaly_patterns(observations: &[Observation]) -> Vec<TemporalPattern> {
    if observations.len() < MIN_ANOMALY_POINTS {
        return Vec::new();
    }
    let Some(mean_value) = mean(observations.iter().map(|o| o.value)) else {
        return Vec::new();
    };
    let variance = mean(observations.iter().map(|o| (o.value - mean_value).powi(2))).unwrap_or(0.0);
    let threshold = ANOMALY_SIGMAS * variance.sqrt();
    if threshold == 0.0 {
        return Vec::new();
    }
    let label = value_label(observations);
    observations
        .iter()
        .enumerate()
        .filter_map(|(position, o)| {
            let deviation = (o.value - mean_value).abs();
            if deviation <= threshold {
                return None;
            }
            let percent = excess_percent(o.value, mean_value);
            let direction = if o.value >= mean_value { "above" } else { "below" };
            let day = o.date.format("%Y-%m-%d");
            Some(TemporalPattern {
                id: format!("temporal-anomaly-{}", position + 1),
                title: format!("Anomalous {label} on {day}"),
                description: format!(
                    "{label} of {} on {day} is {:.1}% {direction} the mean.",
                    o.value,
                    percent.abs()
                ),
                category: TemporalCategory::Anomaly,
                confidence: capped(85.0 + deviation / threshold * 10.0),
                impact: percent.abs(),
                time_range: TimeRange {
                    start: o.date,
                    end: o.date,
                    granularity: Granularity::Day,
                },
                variables: vec![o.date_field.clone(), o.value_field.clone()],
            })
        })
        .collect()
}

fn category_complexity(category: TemporalCategory) -> Complexity {
    match category {
        TemporalCategory::Trend => Complexity::Low,
        TemporalCategory::Seasonal | TemporalCategory::Cyclic => Complexity::Medium,
        TemporalCategory::Anomaly => Complexity::High,
    }
}

/// Frame a temporal pattern as a scoring candidate.
pub fn temporal_to_candidate(pattern: &TemporalPattern) -> PatternCandidate {
    let (business_value, steps): ([&str; 3], [&str; 3]) = match pattern.category {
        TemporalCategory::Seasonal => (
            [
                "Seasonal planning improvements",
                "Capacity aligned with peak periods",
                "Timing optimization opportunities",
            ],
            [
                "Confirm the seasonal peaks against prior years",
                "Shift resources ahead of peak periods",
                "Track peak-period performance each cycle",
            ],
        ),
        TemporalCategory::Trend => (
            [
                "Early warning on sustained movement",
                "Forecast-driven budgeting",
                "Evidence for strategic reviews",
            ],
            [
                "Validate the trend on the latest records",
                "Identify drivers behind the movement",
                "Set thresholds for trend reversal alerts",
            ],
        ),
        TemporalCategory::Cyclic => (
            [
                "Weekly scheduling optimization",
                "Better staffing on high-volume days",
                "Predictable workload planning",
            ],
            [
                "Confirm the weekday pattern over several weeks",
                "Align submissions and staffing with strong days",
                "Monitor weekday performance",
            ],
        ),
        TemporalCategory::Anomaly => (
            [
                "Faster detection of outliers",
                "Risk reduction through pattern awareness",
                "Cleaner data for forecasting",
            ],
            [
                "Investigate the anomalous record",
                "Decide whether to correct or keep the value",
                "Add monitoring for similar deviations",
            ],
        ),
    };
    PatternCandidate::new(
        pattern.id.clone(),
        pattern.title.clone(),
        pattern.description.clone(),
        PatternOrigin::Temporal(pattern.category),
    )
    .with_confidence(pattern.confidence)
    .with_impact(pattern.impact)
    .with_complexity(category_complexity(pattern.category))
    .with_variables(pattern.variables.iter().cloned())
    .with_business_value(business_value)
    .with_implementation_steps(steps)
    .with_metrics([
        format!("{} over time", pattern.category.as_str()),
        "Deviation from baseline".to_string(),
        "Forecast accuracy".to_string(),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use patmine_model::Value;

    fn at(year: i32, month: u32, day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .expect("valid date")
    }

    fn observation(date: NaiveDateTime, value: f64) -> Observation {
        Observation {
            date,
            value,
            date_field: "date".to_string(),
            value_field: "amount".to_string(),
        }
    }

    #[test]
    fn monthly_and_quarterly_peaks() {
        let observations: Vec<Observation> = (1..=12)
            .map(|month| observation(at(2024, month, 10), if month == 12 { 500.0 } else { 100.0 }))
            .collect();
        let patterns = seasonal_patterns(&observations);
        assert_eq!(patterns.len(), 2);
        let monthly = &patterns[0];
        assert_eq!(monthly.id, "temporal-seasonal-monthly");
        assert!(monthly.description.contains("Dec"));
        assert_eq!(monthly.confidence, 75.0);
        assert_eq!(patterns[1].id, "temporal-seasonal-quarterly");
        assert!(patterns[1].description.contains("Q4"));
        assert_eq!(monthly.variables, vec!["date", "amount"]);
    }

    #[test]
    fn flat_series_has_no_trend_or_season() {
        let observations: Vec<Observation> = (1..=20)
            .map(|day| observation(at(2024, 1, day), 50.0))
            .collect();
        assert!(seasonal_patterns(&observations).is_empty());
        assert!(trend_pattern(&observations).is_none());
        assert!(cyclic_pattern(&observations).is_none());
        assert!(anomaly_patterns(&observations).is_empty());
    }

    #[test]
    fn rising_series_is_an_upward_trend() {
        let observations: Vec<Observation> = (1..=10)
            .map(|day| observation(at(2024, 2, day), f64::from(day) * 10.0))
            .collect();
        let trend = trend_pattern(&observations).expect("trend");
        assert_eq!(trend.id, "temporal-trend-upward");
        // slope 10 over mean 55.
        assert!((trend.impact - 1000.0 / 55.0).abs() < 1e-9);
        assert!((trend.confidence - 79.0).abs() < 1e-9);
    }

    #[test]
    fn non_positive_values_are_ignored_by_trend() {
        let observations = vec![
            observation(at(2024, 1, 1), -500.0),
            observation(at(2024, 1, 2), 0.0),
            observation(at(2024, 1, 3), 10.0),
            observation(at(2024, 1, 4), 10.0),
        ];
        assert!(trend_pattern(&observations).is_none());
    }

    #[test]
    fn two_rising_points_are_a_trend() {
        let observations = vec![
            observation(at(2024, 1, 1), 100.0),
            observation(at(2024, 1, 2), 200.0),
        ];
        let trend = trend_pattern(&observations).expect("trend");
        assert_eq!(trend.id, "temporal-trend-upward");
        // slope 100 over mean 150.
        assert!((trend.impact - 10_000.0 / 150.0).abs() < 1e-9);
        assert!((trend.confidence - 75.8).abs() < 1e-9);
    }

    #[test]
    fn single_point_has_no_trend() {
        assert!(trend_pattern(&[observation(at(2024, 1, 1), 100.0)]).is_none());
    }

    #[test]
    fn value_comes_from_first_present_field() {
        let record = |value: Value| -> Record {
            [
                ("date", Value::from("2024-01-05")),
                ("value", value),
                ("amount", Value::from(40.0)),
            ]
            .into_iter()
            .collect()
        };
        let records = vec![
            record(Value::from("n/a")),
            record(Value::Null),
            record(Value::from(7.0)),
        ];
        let observations = TemporalMiner::default().observations(&records);
        let picked: Vec<(&str, f64)> = observations
            .iter()
            .map(|o| (o.value_field.as_str(), o.value))
            .collect();
        assert_eq!(picked, vec![("amount", 40.0), ("value", 7.0)]);
    }

    #[test]
    fn weekday_cycle() {
        // 2024-01-01 is a Monday.
        let observations: Vec<Observation> = (1..=28)
            .map(|day| {
                let date = at(2024, 1, day);
                let value = if DateParts::of(date).day_of_week == 5 { 300.0 } else { 100.0 };
                observation(date, value)
            })
            .collect();
        let cycle = cyclic_pattern(&observations).expect("weekly cycle");
        assert!(cycle.description.contains("Fri"));
        assert!((cycle.confidence - (80.0 + 0.28 * 15.0)).abs() < 1e-9);
    }

    #[test]
    fn anomalies_need_ten_points() {
        let observations: Vec<Observation> = (1..=9)
            .map(|day| observation(at(2024, 1, day), if day == 9 { 1000.0 } else { 1.0 }))
            .collect();
        assert!(anomaly_patterns(&observations).is_empty());
    }

    #[test]
    fn candidate_complexity_follows_category() {
        let observations: Vec<Observation> = (1..=10)
            .map(|day| observation(at(2024, 2, day), f64::from(day) * 10.0))
            .collect();
        let trend = trend_pattern(&observations).expect("trend");
        let candidate = temporal_to_candidate(&trend);
        assert_eq!(candidate.complexity, Complexity::Low);
        assert_eq!(candidate.origin, PatternOrigin::Temporal(TemporalCategory::Trend));
        assert_eq!(candidate.confidence, Some(trend.confidence));
        assert_eq!(candidate.impact, Some(trend.impact));
    }
}
