//! Level-wise frequent itemset mining and association rule generation.
//!
//! # Algorithm
//!
//! 1. Count single tokens; keep those with support >= `min_support`
//! 2. Join frequent (k-1)-itemsets sharing their first k-2 tokens into
//!    k-candidates, drop candidates with an infrequent (k-1)-subset
//! 3. Keep candidates with support >= `min_support`; repeat up to
//!    `max_itemset_size`
//! 4. For every frequent itemset of size >= 2, every proper non-empty subset
//!    is an antecedent and its complement the consequent
//! 5. Keep rules with confidence >= `min_confidence`, sorted by lift
//!
//! With the default `max_itemset_size` of 2 this is exactly the pairwise
//! enumeration of retained single tokens.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use patmine_model::{AnalysisConfig, AssociationRule, Itemset, RuleMetrics, token_field};

use crate::transactions::Transaction;

/// A frequent itemset and its support.
#[derive(Debug, Clone, PartialEq)]
pub struct FrequentItemset {
    pub items: Itemset,
    pub support: f64,
}

/// Association rule miner over token transactions.
#[derive(Debug, Clone, PartialEq)]
pub struct AssociationMiner {
    min_support: f64,
    min_confidence: f64,
    max_itemset_size: usize,
    max_field_cardinality: Option<usize>,
}

impl Default for AssociationMiner {
    fn default() -> Self {
        Self::new()
    }
}

impl AssociationMiner {
    pub fn new() -> Self {
        Self {
            min_support: 0.1,
            min_confidence: 0.6,
            max_itemset_size: 2,
            max_field_cardinality: None,
        }
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new()
            .with_min_support(config.min_support)
            .with_min_confidence(config.min_confidence)
            .with_max_itemset_size(config.mining.max_itemset_size)
            .with_max_field_cardinality(config.mining.max_field_cardinality)
    }

    #[must_use]
    pub fn with_min_support(mut self, min_support: f64) -> Self {
        self.min_support = min_support;
        self
    }

    #[must_use]
    pub fn with_min_confidence(mut self, min_confidence: f64) -> Self {
        self.min_confidence = min_confidence;
        self
    }

    /// Values below 2 still mine pairs.
    #[must_use]
    pub fn with_max_itemset_size(mut self, size: usize) -> Self {
        self.max_itemset_size = size.max(2);
        self
    }

    #[must_use]
    pub fn with_max_field_cardinality(mut self, ceiling: Option<usize>) -> Self {
        self.max_field_cardinality = ceiling;
        self
    }

    /// All frequent itemsets, smallest first, each level in token order.
    pub fn frequent_itemsets(&self, transactions: &[Transaction]) -> Vec<FrequentItemset> {
        self.frequent_levels(transactions)
            .into_iter()
            .flatten()
            .map(|(items, support)| FrequentItemset { items, support })
            .collect()
    }

    /// Rules meeting `min_confidence`, sorted by descending lift.
    ///
    /// Equal lifts keep generation order, which is deterministic.
    pub fn mine(&self, transactions: &[Transaction]) -> Vec<AssociationRule> {
        let levels = self.frequent_levels(transactions);
        let supports: BTreeMap<&Itemset, f64> = levels
            .iter()
            .flatten()
            .map(|(items, support)| (items, *support))
            .collect();
        let support_of = |items: &Itemset| {
            supports
                .get(items)
                .copied()
                .unwrap_or_else(|| support(items, transactions))
        };

        let mut rules = Vec::new();
        for (items, union_support) in levels.iter().skip(1).flatten() {
            let tokens: Vec<&String> = items.iter().collect();
            for antecedent_mask in proper_subset_masks(tokens.len()) {
                let (antecedent, consequent) = split_by_mask(&tokens, antecedent_mask);
                let metrics = rule_metrics(
                    *union_support,
                    support_of(&antecedent),
                    support_of(&consequent),
                );
                if metrics.confidence >= self.min_confidence {
                    rules.push(AssociationRule {
                        antecedent,
                        consequent,
                        metrics,
                    });
                }
            }
        }
        rules.sort_by(|a, b| b.lift().total_cmp(&a.lift()));
        debug!(
            transactions = transactions.len(),
            frequent = supports.len(),
            rules = rules.len(),
            "mined association rules"
        );
        rules
    }

    /// Frequent itemsets per level: index 0 holds singletons.
    fn frequent_levels(&self, transactions: &[Transaction]) -> Vec<Vec<(Itemset, f64)>> {
        if transactions.is_empty() {
            return Vec::new();
        }
        let total = transactions.len() as f64;
        let excluded = self.high_cardinality_fields(transactions);

        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for transaction in transactions {
            for item in transaction {
                if !excluded.contains(token_field(item)) {
                    *counts.entry(item.as_str()).or_insert(0) += 1;
                }
            }
        }
        let singles: Vec<(Itemset, f64)> = counts
            .into_iter()
            .map(|(item, count)| (Itemset::from([item.to_string()]), count as f64 / total))
            .filter(|(_, support)| *support >= self.min_support)
            .collect();
        debug!(frequent = singles.len(), size = 1, "frequent itemsets");

        let mut levels = vec![singles];
        while levels.len() < self.max_itemset_size {
            let Some(previous) = levels.last() else {
                break;
            };
            let next: Vec<(Itemset, f64)> = join_candidates(previous)
                .into_iter()
                .map(|candidate| {
                    let support = support(&candidate, transactions);
                    (candidate, support)
                })
                .filter(|(_, support)| *support >= self.min_support)
                .collect();
            debug!(frequent = next.len(), size = levels.len() + 1, "frequent itemsets");
            if next.is_empty() {
                break;
            }
            levels.push(next);
        }
        levels
    }

    fn high_cardinality_fields(&self, transactions: &[Transaction]) -> BTreeSet<String> {
        let Some(ceiling) = self.max_field_cardinality else {
            return BTreeSet::new();
        };
        let mut distinct: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
        for item in transactions.iter().flatten() {
            distinct
                .entry(token_field(item))
                .or_default()
                .insert(item.as_str());
        }
        let excluded: BTreeSet<String> = distinct
            .into_iter()
            .filter(|(_, tokens)| tokens.len() > ceiling)
            .map(|(field, _)| field.to_string())
            .collect();
        if !excluded.is_empty() {
            debug!(fields = ?excluded, ceiling, "fields above cardinality ceiling skipped");
        }
        excluded
    }
}

/// Apriori join of same-size itemsets plus subset pruning.
fn join_candidates(previous: &[(Itemset, f64)]) -> Vec<Itemset> {
    let frequent: BTreeSet<&Itemset> = previous.iter().map(|(items, _)| items).collect();
    let sorted: Vec<Vec<&String>> = previous
        .iter()
        .map(|(items, _)| items.iter().collect())
        .collect();
    let mut candidates = BTreeSet::new();
    for (i, left) in sorted.iter().enumerate() {
        for right in &sorted[i + 1..] {
            let prefix = left.len() - 1;
            if left[..prefix] != right[..prefix] {
                continue;
            }
            let candidate: Itemset = left.iter().chain(right.iter()).map(|s| (*s).clone()).collect();
            if candidate.len() == left.len() + 1 && all_subsets_frequent(&candidate, &frequent) {
                candidates.insert(candidate);
            }
        }
    }
    candidates.into_iter().collect()
}

fn all_subsets_frequent(candidate: &Itemset, frequent: &BTreeSet<&Itemset>) -> bool {
    candidate.iter().all(|skip| {
        let subset: Itemset = candidate.iter().filter(|item| *item != skip).cloned().collect();
        frequent.contains(&subset)
    })
}

/// Bit masks of every proper non-empty subset of `n` items.
fn proper_subset_masks(n: usize) -> impl Iterator<Item = u64> {
    let full = if n >= 64 { u64::MAX } else { (1u64 << n) - 1 };
    1..full
}

fn split_by_mask(tokens: &[&String], mask: u64) -> (Itemset, Itemset) {
    let mut antecedent = Itemset::new();
    let mut consequent = Itemset::new();
    for (index, token) in tokens.iter().enumerate() {
        if mask & (1 << index) != 0 {
            antecedent.insert((*token).clone());
        } else {
            consequent.insert((*token).clone());
        }
    }
    (antecedent, consequent)
}

/// Fraction of transactions containing every token of `itemset`.
pub fn support(itemset: &Itemset, transactions: &[Transaction]) -> f64 {
    if transactions.is_empty() {
        return 0.0;
    }
    let hits = transactions
        .iter()
        .filter(|transaction| itemset.is_subset(transaction))
        .count();
    hits as f64 / transactions.len() as f64
}

/// Confidence, lift and conviction with every division guarded.
///
/// Conviction is `None` when confidence reaches 1.
pub fn rule_metrics(union_support: f64, antecedent_support: f64, consequent_support: f64) -> RuleMetrics {
    let confidence = if antecedent_support > 0.0 {
        union_support / antecedent_support
    } else {
        0.0
    };
    let lift = if antecedent_support > 0.0 && consequent_support > 0.0 {
        confidence / consequent_support
    } else {
        0.0
    };
    let conviction = if consequent_support <= 0.0 {
        Some(0.0)
    } else if confidence >= 1.0 {
        None
    } else {
        Some((1.0 - consequent_support) / (1.0 - confidence))
    };
    RuleMetrics {
        support: union_support,
        confidence,
        lift,
        conviction,
    }
}
