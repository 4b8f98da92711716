use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemporalCategory {
    Seasonal,
    Trend,
    Cyclic,
    Anomaly,
}

impl TemporalCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Seasonal => "seasonal",
            Self::Trend => "trend",
            Self::Cyclic => "cyclic",
            Self::Anomaly => "anomaly",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Day,
    Week,
    Month,
    Quarter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub granularity: Granularity,
}

/// A time-based regularity or outlier found in the value series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemporalPattern {
    pub id: String,
    pub title: String,
    pub description: String,
    pub category: TemporalCategory,
    /// Percentage, at most 95.
    pub confidence: f64,
    /// Percentage.
    pub impact: f64,
    pub time_range: TimeRange,
    pub variables: Vec<String>,
}
