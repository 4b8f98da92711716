//! Records to `field=value` token sets.

use std::collections::BTreeSet;

use patmine_model::{Record, Value, is_reserved_field};

/// The token set of one record.
pub type Transaction = BTreeSet<String>;

pub fn token(field: &str, value: &Value) -> String {
    format!("{field}={value}")
}

/// Whether `field` contributes a token: truthy, non-empty, not reserved and
/// not a structured value.
pub fn is_eligible(field: &str, value: &Value) -> bool {
    value.is_truthy() && !value.is_structured() && !is_reserved_field(field)
}

/// `None` when the record has no eligible field.
pub fn encode_transaction(record: &Record) -> Option<Transaction> {
    let transaction: Transaction = record
        .iter()
        .filter(|(field, value)| is_eligible(field, value))
        .map(|(field, value)| token(field, value))
        .collect();
    (!transaction.is_empty()).then_some(transaction)
}

/// One transaction per record with at least one eligible field.
pub fn encode_transactions<R: AsRef<Record>>(records: &[R]) -> Vec<Transaction> {
    records
        .iter()
        .filter_map(|record| encode_transaction(record.as_ref()))
        .collect()
}
