pub mod association;
pub mod refine;
pub mod temporal;
pub mod transactions;

pub use association::{AssociationMiner, FrequentItemset, rule_metrics, support};
pub use refine::{RuleCategory, rule_id, rule_to_candidate, rule_variables, title_case};
pub use temporal::{
    MAX_TEMPORAL_CONFIDENCE, Observation, TemporalMiner, anomaly_patterns, cyclic_pattern,
    seasonal_patterns, temporal_to_candidate, trend_pattern,
};
pub use transactions::{Transaction, encode_transaction, encode_transactions, token};
