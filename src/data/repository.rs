//! Whole-collection persistence of expense records.
//!
//! The collection lives under a single key as a JSON array:
//! `[{"id": "...", "date": "2024-03-07", "amount": 12.5, "description": "coffee"}]`
//!
//! Reads are forgiving: an absent key, a blob that is not a JSON array, or
//! individual undecodable elements all degrade to "fewer records" instead of
//! failing the caller.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::models::{parse_amount, ExpenseId, ExpenseRecord};
use super::storage::KeyValueStore;

/// Storage key owned by the expense collection
pub const EXPENSES_KEY: &str = "expenses";

/// Record as it appears in the persisted blob
#[derive(Debug, Deserialize)]
struct StoredExpense {
    /// Absent in blobs written before records carried ids
    #[serde(default)]
    id: Option<ExpenseId>,
    date: NaiveDate,
    /// JSON number, or a numeric string in hand-edited blobs
    amount: Value,
    description: String,
}

/// Exact decimal behind a stored amount.
///
/// Number tokens keep their literal digits, so nothing passes through `f64`.
fn stored_amount(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => parse_amount(&n.to_string()),
        Value::String(s) => parse_amount(s),
        _ => None,
    }
}

#[derive(Serialize)]
struct StoredExpenseRef<'a> {
    id: &'a ExpenseId,
    date: NaiveDate,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    amount: Decimal,
    description: &'a str,
}

/// Loads and saves the full expense collection through a [`KeyValueStore`]
pub struct ExpenseRepository<S> {
    store: S,
    key: String,
}

impl<S: KeyValueStore> ExpenseRepository<S> {
    /// Repository over the default `expenses` key
    pub fn new(store: S) -> Self {
        Self::with_key(store, EXPENSES_KEY)
    }

    pub fn with_key(store: S, key: impl Into<String>) -> Self {
        ExpenseRepository {
            store,
            key: key.into(),
        }
    }

    /// Underlying substrate
    #[cfg(test)]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Read every stored record in storage order
    pub fn load(&self) -> Result<Vec<ExpenseRecord>> {
        match self.store.get(&self.key)? {
            Some(blob) => Ok(decode_collection(&blob)),
            None => {
                debug!(key = %self.key, "no stored expenses yet");
                Ok(Vec::new())
            }
        }
    }

    /// Replace the stored collection with `records`
    pub fn save(&self, records: &[ExpenseRecord]) -> Result<()> {
        let blob = encode_collection(records)?;
        self.store.set(&self.key, &blob)?;
        debug!(key = %self.key, count = records.len(), "saved expenses");
        Ok(())
    }
}

fn decode_collection(blob: &str) -> Vec<ExpenseRecord> {
    let values: Vec<Value> = match serde_json::from_str(blob) {
        Ok(values) => values,
        Err(e) => {
            warn!(error = %e, "stored expenses are not a JSON array, treating as empty");
            return Vec::new();
        }
    };

    values
        .into_iter()
        .enumerate()
        .filter_map(|(position, value)| {
            let stored = match serde_json::from_value::<StoredExpense>(value) {
                Ok(stored) => stored,
                Err(e) => {
                    warn!(position, error = %e, "skipping undecodable expense");
                    return None;
                }
            };
            let Some(amount) = stored_amount(&stored.amount) else {
                warn!(position, amount = %stored.amount, "skipping expense with bad amount");
                return None;
            };
            Some(ExpenseRecord {
                id: stored.id.unwrap_or_else(|| ExpenseId::legacy(position)),
                date: stored.date,
                amount,
                description: stored.description,
            })
        })
        .collect()
}

fn encode_collection(records: &[ExpenseRecord]) -> Result<String> {
    let stored: Vec<StoredExpenseRef<'_>> = records
        .iter()
        .map(|record| StoredExpenseRef {
            id: &record.id,
            date: record.date,
            amount: record.amount,
            description: &record.description,
        })
        .collect();
    serde_json::to_string(&stored).context("Failed to serialize expenses")
}
