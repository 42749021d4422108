//! Data layer for expense records.
//!
//! Handles validation, the whole-collection repository over a key-value
//! substrate, and the derived ledger and daily-total views.

mod error;
mod models;
mod repository;
mod storage;
mod store;
mod summary;

pub use error::{StoreError, ValidationError};
pub use models::{ExpenseId, ExpenseInput, ExpenseRecord};
#[cfg(test)]
pub use storage::MemoryStore;
pub use storage::{open_store, KeyValueStore, StorageKind};
pub use store::ExpenseStore;
pub use summary::DailySummary;
