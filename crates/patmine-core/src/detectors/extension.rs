use patmine_model::{Detection, Record};

use super::{DetectionContext, PatternDetector};

/// A catalog entry with no field-specific logic yet.
///
/// Always answers insufficient data, naming the fields a future
/// implementation would read.
pub struct ExtensionPoint {
    id: &'static str,
    title: &'static str,
    summary: &'static str,
    required_fields: &'static [&'static str],
}

impl ExtensionPoint {
    pub const fn new(
        id: &'static str,
        title: &'static str,
        summary: &'static str,
        required_fields: &'static [&'static str],
    ) -> Self {
        Self {
            id,
            title,
            summary,
            required_fields,
        }
    }

    pub const fn geographic_inefficiency() -> Self {
        Self::new(
            "geographic_inefficiency",
            "The Geographic Inefficiency Pattern",
            "Travel and distance costs eroding regional margins",
            &["region", "travel_cost", "profit_margin"],
        )
    }

    pub const fn client_maturity() -> Self {
        Self::new(
            "client_maturity",
            "The Client Maturity Curve",
            "Win rate and margin as client relationships age",
            &["client_type", "client_tenure", "win_rate"],
        )
    }

    pub const fn performance_prediction() -> Self {
        Self::new(
            "performance_prediction",
            "The Performance Prediction Signal",
            "Early project attributes predicting final performance",
            &["team_size", "duration_months", "performance_score"],
        )
    }
}

impl PatternDetector for ExtensionPoint {
    fn id(&self) -> &'static str {
        self.id
    }

    fn title(&self) -> &'static str {
        self.title
    }

    fn summary(&self) -> &'static str {
        self.summary
    }

    fn required_fields(&self) -> &'static [&'static str] {
        self.required_fields
    }

    fn detect(&self, _records: &[Record], _context: &DetectionContext<'_>) -> Detection {
        self.insufficient()
    }
}
