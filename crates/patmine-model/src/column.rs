use std::fmt;

use serde::{Deserialize, Serialize};

/// Semantic type of a column.
///
/// Variant order is the tie-break order used by type inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnType {
    Date,
    Numeric,
    Boolean,
    Categorical,
    Text,
}

impl ColumnType {
    pub const EVALUATION_ORDER: [ColumnType; 5] = [
        ColumnType::Date,
        ColumnType::Numeric,
        ColumnType::Boolean,
        ColumnType::Categorical,
        ColumnType::Text,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Numeric => "numeric",
            Self::Boolean => "boolean",
            Self::Categorical => "categorical",
            Self::Text => "text",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnTypeInference {
    pub column: String,
    pub inferred_type: ColumnType,
    /// In `[0, 1]`.
    pub confidence: f64,
}
