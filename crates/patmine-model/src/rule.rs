use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A set of `field=value` tokens.
pub type Itemset = BTreeSet<String>;

/// Raw association statistics of a mined rule.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleMetrics {
    pub support: f64,
    pub confidence: f64,
    pub lift: f64,
    /// `None` when confidence is 1 and conviction is unbounded.
    pub conviction: Option<f64>,
}

/// `antecedent => consequent` with its statistics. The sides are disjoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssociationRule {
    pub antecedent: Itemset,
    pub consequent: Itemset,
    #[serde(flatten)]
    pub metrics: RuleMetrics,
}

impl AssociationRule {
    pub fn support(&self) -> f64 {
        self.metrics.support
    }

    pub fn confidence(&self) -> f64 {
        self.metrics.confidence
    }

    pub fn lift(&self) -> f64 {
        self.metrics.lift
    }

    pub fn conviction(&self) -> Option<f64> {
        self.metrics.conviction
    }

    /// All tokens of the rule, antecedent first.
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.antecedent
            .iter()
            .chain(&self.consequent)
            .map(String::as_str)
    }
}

impl fmt::Display for AssociationRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let join = |items: &Itemset| items.iter().cloned().collect::<Vec<_>>().join(", ");
        write!(
            f,
            "{{{}}} => {{{}}}",
            join(&self.antecedent),
            join(&self.consequent)
        )
    }
}

/// Field name of a `field=value` token.
pub fn token_field(token: &str) -> &str {
    token.split_once('=').map_or(token, |(field, _)| field)
}
