//! Data sources and their kinds.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::record::Record;

/// Business system a source was exported from.
///
/// `Generic` is the bag-of-fields fallback: unknown kind labels deserialize to
/// it instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Crm,
    Erp,
    Financial,
    Hr,
    Projects,
    Tenders,
    #[default]
    #[serde(other)]
    Generic,
}

/// Expected key and value fields of a known source kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KindSchema {
    pub key_fields: &'static [&'static str],
    pub value_fields: &'static [&'static str],
}

impl KindSchema {
    pub fn expected_fields(&self) -> impl Iterator<Item = &'static str> {
        self.key_fields.iter().chain(self.value_fields).copied()
    }

    /// Expected fields absent from every record in `records`.
    pub fn missing_fields(&self, records: &[Record]) -> Vec<&'static str> {
        self.expected_fields()
            .filter(|field| !records.iter().any(|record| record.contains(field)))
            .collect()
    }
}

const CRM_SCHEMA: KindSchema = KindSchema {
    key_fields: &["sector", "team_size", "submission_date", "client_type"],
    value_fields: &["deal_value", "status", "win_rate", "sales_stage"],
};
const ERP_SCHEMA: KindSchema = KindSchema {
    key_fields: &["project_type", "team_composition", "client_sector"],
    value_fields: &["completion_rate", "budget", "actual_cost", "timeline"],
};
const FINANCIAL_SCHEMA: KindSchema = KindSchema {
    key_fields: &["month", "quarter", "year", "department"],
    value_fields: &["revenue", "costs", "profit_margin", "budget"],
};
const HR_SCHEMA: KindSchema = KindSchema {
    key_fields: &["experience_level", "certification", "department"],
    value_fields: &["performance_score", "billable_hours", "satisfaction"],
};
const PROJECTS_SCHEMA: KindSchema = KindSchema {
    key_fields: &["project_type", "team_size", "duration"],
    value_fields: &["success_rate", "client_satisfaction", "profit_margin"],
};
const TENDERS_SCHEMA: KindSchema = KindSchema {
    key_fields: &["submission_date", "sector", "budget_range"],
    value_fields: &["win_rate", "competition_level", "success_rate"],
};

/// File-name keywords per kind, checked in this order.
const NAME_KEYWORDS: &[(SourceKind, &[&str])] = &[
    (
        SourceKind::Crm,
        &["crm", "sales", "deals", "leads", "opportunities"],
    ),
    (SourceKind::Erp, &["erp", "tasks", "workflow"]),
    (
        SourceKind::Financial,
        &["financial", "finance", "revenue", "cost", "profit"],
    ),
    (SourceKind::Hr, &["hr", "employee", "personnel", "staff"]),
    (SourceKind::Tenders, &["tender", "bid", "proposal", "rfp"]),
    (SourceKind::Projects, &["project", "assignment", "delivery"]),
];

impl SourceKind {
    pub const ALL: [SourceKind; 7] = [
        SourceKind::Crm,
        SourceKind::Erp,
        SourceKind::Financial,
        SourceKind::Hr,
        SourceKind::Projects,
        SourceKind::Tenders,
        SourceKind::Generic,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Crm => "crm",
            Self::Erp => "erp",
            Self::Financial => "financial",
            Self::Hr => "hr",
            Self::Projects => "projects",
            Self::Tenders => "tenders",
            Self::Generic => "generic",
        }
    }

    /// Lenient label lookup; unknown labels map to [`SourceKind::Generic`].
    pub fn from_label(label: &str) -> Self {
        label.parse().unwrap_or(Self::Generic)
    }

    /// Guess the kind from a file or source name; defaults to projects.
    pub fn detect_from_name(name: &str) -> Self {
        let lower = name.to_lowercase();
        NAME_KEYWORDS
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|keyword| lower.contains(keyword)))
            .map_or(Self::Projects, |(kind, _)| *kind)
    }

    /// Expected schema, or `None` for the generic fallback.
    pub fn schema(self) -> Option<&'static KindSchema> {
        match self {
            Self::Crm => Some(&CRM_SCHEMA),
            Self::Erp => Some(&ERP_SCHEMA),
            Self::Financial => Some(&FINANCIAL_SCHEMA),
            Self::Hr => Some(&HR_SCHEMA),
            Self::Projects => Some(&PROJECTS_SCHEMA),
            Self::Tenders => Some(&TENDERS_SCHEMA),
            Self::Generic => None,
        }
    }
}

impl FromStr for SourceKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ModelError::UnknownSourceKind(s.to_string()))
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A labelled, read-only batch of records handed to the merger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSource {
    /// Unique per analysis run.
    pub name: String,
    pub kind: SourceKind,
    pub records: Vec<Record>,
}

impl DataSource {
    pub fn new(name: impl Into<String>, kind: SourceKind, records: Vec<Record>) -> Self {
        Self {
            name: name.into(),
            kind,
            records,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_kind_from_file_names() {
        assert_eq!(SourceKind::detect_from_name("Q3_sales_deals.csv"), SourceKind::Crm);
        assert_eq!(SourceKind::detect_from_name("employee_roster.json"), SourceKind::Hr);
        assert_eq!(SourceKind::detect_from_name("rfp_responses.csv"), SourceKind::Tenders);
        assert_eq!(SourceKind::detect_from_name("profit-and-loss.csv"), SourceKind::Financial);
        assert_eq!(SourceKind::detect_from_name("misc.csv"), SourceKind::Projects);
    }

    #[test]
    fn unknown_kind_labels_fall_back_to_generic() {
        let kind: SourceKind = serde_json::from_str("\"warehouse\"").expect("parse kind");
        assert_eq!(kind, SourceKind::Generic);
        assert_eq!(SourceKind::from_label("CRM"), SourceKind::Crm);
        assert!("".parse::<SourceKind>().is_err());
    }

    #[test]
    fn schema_reports_missing_fields() {
        let records: Vec<Record> = vec![
            [("deal_value", 10.0), ("win_rate", 1.0)].into_iter().collect(),
        ];
        let missing = SourceKind::Crm
            .schema()
            .expect("crm schema")
            .missing_fields(&records);
        assert!(missing.contains(&"status"));
        assert!(!missing.contains(&"deal_value"));
        assert!(SourceKind::Generic.schema().is_none());
    }
}
