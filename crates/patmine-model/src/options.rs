//! Configuration options for an analysis run.

use serde::{Deserialize, Serialize};

/// Requested analysis depth. Advisory: recorded, never enforced by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplexityLevel {
    #[default]
    Medium,
    High,
    Expert,
}

/// Top-level options of an analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AnalysisConfig {
    /// Maximum number of ranked patterns returned.
    pub max_patterns: usize,
    /// Minimum scored confidence, 0-1.
    pub min_confidence: f64,
    /// Minimum support, 0-1. Also the itemset support threshold.
    pub min_support: f64,
    pub complexity_level: ComplexityLevel,
    /// Advisory tags, carried through untouched.
    pub focus_areas: Vec<String>,
    pub cleaning: CleaningConfig,
    pub mining: MiningConfig,
    pub fields: FieldFallbacks,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_patterns: 8,
            min_confidence: 0.6,
            min_support: 0.1,
            complexity_level: ComplexityLevel::default(),
            focus_areas: Vec::new(),
            cleaning: CleaningConfig::default(),
            mining: MiningConfig::default(),
            fields: FieldFallbacks::default(),
        }
    }
}

impl AnalysisConfig {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_max_patterns(mut self, max_patterns: usize) -> Self {
        self.max_patterns = max_patterns;
        self
    }

    #[must_use]
    pub fn with_min_confidence(mut self, min_confidence: f64) -> Self {
        self.min_confidence = min_confidence;
        self
    }

    #[must_use]
    pub fn with_min_support(mut self, min_support: f64) -> Self {
        self.min_support = min_support;
        self
    }

    #[must_use]
    pub fn with_max_itemset_size(mut self, size: usize) -> Self {
        self.mining.max_itemset_size = size;
        self
    }
}

/// Options of the cleaner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CleaningConfig {
    /// Explicit date columns. Confidently inferred ones are added.
    pub date_columns: Vec<String>,
    pub numeric_columns: Vec<String>,
    pub categorical_columns: Vec<String>,
    pub max_bins: usize,
    /// Documents intended date sensitivity; not read by the cleaner.
    pub date_threshold: usize,
    /// Derive `profit_margin` for financial and `win_rate` for crm records.
    pub derive_kind_features: bool,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            date_columns: Vec::new(),
            numeric_columns: Vec::new(),
            categorical_columns: Vec::new(),
            max_bins: 5,
            date_threshold: 20,
            derive_kind_features: true,
        }
    }
}

/// Options of the association miner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MiningConfig {
    /// Largest frequent itemset size. 2 mines pairs only.
    pub max_itemset_size: usize,
    /// Fields with more distinct tokens than this are left out of itemset mining.
    pub max_field_cardinality: Option<usize>,
}

impl Default for MiningConfig {
    fn default() -> Self {
        Self {
            max_itemset_size: 2,
            max_field_cardinality: None,
        }
    }
}

/// Ordered field-name fallback chains. The first present field wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FieldFallbacks {
    pub date: Vec<String>,
    pub value: Vec<String>,
    pub profit: Vec<String>,
}

pub const DEFAULT_DATE_FIELDS: [&str; 3] = ["date", "created_date", "submission_date"];
pub const DEFAULT_VALUE_FIELDS: [&str; 3] = ["value", "amount", "revenue"];
pub const DEFAULT_PROFIT_FIELDS: [&str; 3] = ["profit_margin", "margin", "profit"];

impl Default for FieldFallbacks {
    fn default() -> Self {
        let owned = |fields: &[&str]| fields.iter().map(ToString::to_string).collect();
        Self {
            date: owned(&DEFAULT_DATE_FIELDS),
            value: owned(&DEFAULT_VALUE_FIELDS),
            profit: owned(&DEFAULT_PROFIT_FIELDS),
        }
    }
}

impl FieldFallbacks {
    pub fn date_fields(&self) -> Vec<&str> {
        self.date.iter().map(String::as_str).collect()
    }

    pub fn value_fields(&self) -> Vec<&str> {
        self.value.iter().map(String::as_str).collect()
    }

    pub fn profit_fields(&self) -> Vec<&str> {
        self.profit.iter().map(String::as_str).collect()
    }
}
