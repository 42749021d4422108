//! Expense operations: add, ledger listing, deletion and daily totals.
//!
//! Each operation reads the whole collection, works on it in memory and, if
//! it mutates, writes the whole collection back. Nothing is cached between
//! calls; the persisted blob is the only source of truth.

use std::collections::HashSet;

use chrono::{Local, NaiveDate};
use tracing::{debug, info};

use super::error::{StoreError, StoreResult};
use super::models::{ExpenseId, ExpenseInput, ExpenseRecord};
use super::repository::ExpenseRepository;
use super::storage::KeyValueStore;
use super::summary::DailySummary;

/// Today's date on the local calendar
fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

/// Stable sort by date; records on the same day keep their storage order
fn sort_by_date(records: &mut [ExpenseRecord]) {
    records.sort_by_key(|r| r.date);
}

/// Expense store over a key-value substrate
pub struct ExpenseStore<S> {
    repository: ExpenseRepository<S>,
    today: fn() -> NaiveDate,
}

impl<S: KeyValueStore> ExpenseStore<S> {
    pub fn new(store: S) -> Self {
        Self::from_repository(ExpenseRepository::new(store))
    }

    pub fn from_repository(repository: ExpenseRepository<S>) -> Self {
        ExpenseStore {
            repository,
            today: local_today,
        }
    }

    /// Replace the clock used to reject future-dated expenses
    pub fn with_clock(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// Latest date an expense may carry
    pub fn today(&self) -> NaiveDate {
        (self.today)()
    }

    #[cfg(test)]
    pub fn repository(&self) -> &ExpenseRepository<S> {
        &self.repository
    }

    /// Validate `input` and append it as a new record.
    ///
    /// Validation runs before storage is touched, so a rejected input
    /// leaves the persisted collection untouched.
    pub fn add(&self, input: &ExpenseInput) -> StoreResult<ExpenseRecord> {
        let expense = input.validate(self.today())?;
        let record = ExpenseRecord::new(expense.date, expense.amount, expense.description);

        let mut records = self.repository.load()?;
        records.push(record.clone());
        self.repository.save(&records)?;

        info!(id = %record.id, date = %record.date, amount = %record.amount, "expense added");
        Ok(record)
    }

    /// Every record ordered by date ascending. Never writes.
    pub fn list_sorted(&self) -> StoreResult<Vec<ExpenseRecord>> {
        let mut records = self.repository.load()?;
        sort_by_date(&mut records);
        Ok(records)
    }

    /// Delete rows by their position in [`Self::list_sorted`].
    ///
    /// The sorted sequence is rebuilt here, so positions refer to the ledger
    /// as it is now; the survivors are written back in ledger order.
    /// Out-of-range positions are ignored. Returns how many records were removed.
    pub fn delete_by_indices(&self, indices: impl IntoIterator<Item = usize>) -> StoreResult<usize> {
        let indices: HashSet<usize> = indices.into_iter().collect();
        if indices.is_empty() {
            return Err(StoreError::NothingSelected);
        }

        let sorted = self.list_sorted()?;
        let before = sorted.len();
        let remaining: Vec<ExpenseRecord> = sorted
            .into_iter()
            .enumerate()
            .filter(|(idx, _)| !indices.contains(idx))
            .map(|(_, record)| record)
            .collect();

        self.persist_removal(before, &remaining)
    }

    /// Delete every record whose id is in `ids`; unknown ids are ignored.
    /// Survivors keep their storage order. Returns how many records were removed.
    pub fn delete_by_ids(&self, ids: &HashSet<ExpenseId>) -> StoreResult<usize> {
        if ids.is_empty() {
            return Err(StoreError::NothingSelected);
        }

        let mut records = self.repository.load()?;
        let before = records.len();
        records.retain(|record| !ids.contains(&record.id));

        self.persist_removal(before, &records)
    }

    fn persist_removal(&self, before: usize, remaining: &[ExpenseRecord]) -> StoreResult<usize> {
        let removed = before - remaining.len();
        if removed == 0 {
            debug!("selection matched no stored expenses, nothing written");
            return Ok(0);
        }
        self.repository.save(remaining)?;
        info!(removed, remaining = remaining.len(), "expenses deleted");
        Ok(removed)
    }

    /// Totals per display date, in first-seen storage order
    pub fn monthly_summary(&self) -> StoreResult<DailySummary> {
        let records = self.repository.load()?;
        DailySummary::from_records(&records)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use rust_decimal::Decimal;

    use super::*;
    use crate::data::error::{Field, ValidationError};
    use crate::data::repository::EXPENSES_KEY;
    use crate::data::storage::{FileStore, MemoryStore, SqliteStore};

    fn fixed_today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 31).unwrap()
    }

    fn store_with(substrate: MemoryStore) -> ExpenseStore<MemoryStore> {
        ExpenseStore::new(substrate).with_clock(fixed_today)
    }

    fn raw_blob<S: KeyValueStore>(store: &ExpenseStore<S>) -> Option<String> {
        store.repository().store().get(EXPENSES_KEY).unwrap()
    }

    /// coffee (03-07) added before bus (03-05)
    fn coffee_then_bus() -> ExpenseStore<MemoryStore> {
        let store = store_with(MemoryStore::default());
        store
            .add(&ExpenseInput::new("2024-03-07", "12.5", "coffee"))
            .unwrap();
        store
            .add(&ExpenseInput::new("2024-03-05", "7.25", "bus"))
            .unwrap();
        store
    }

    fn descriptions(records: &[ExpenseRecord]) -> Vec<&str> {
        records.iter().map(|r| r.description.as_str()).collect()
    }

    #[test]
    fn test_list_sorted_on_empty_store() {
        let store = store_with(MemoryStore::default());
        assert!(store.list_sorted().unwrap().is_empty());
        assert!(store.monthly_summary().unwrap().is_empty());
        assert_eq!(raw_blob(&store), None);
    }

    #[test]
    fn test_added_record_listed_once_in_date_order() {
        let store = coffee_then_bus();
        let added = store
            .add(&ExpenseInput::new("2024-03-06", "3", "snack"))
            .unwrap();

        let listed = store.list_sorted().unwrap();
        assert_eq!(listed.iter().filter(|r| r.id == added.id).count(), 1);
        assert!(listed.windows(2).all(|w| w[0].date <= w[1].date));
    }

    #[test]
    fn test_scenario_ledger_and_summary() {
        let store = coffee_then_bus();

        let listed = store.list_sorted().unwrap();
        assert_eq!(descriptions(&listed), vec!["bus", "coffee"]);

        let summary = store.monthly_summary().unwrap();
        assert_eq!(summary.labels(), vec!["07-03-24", "05-03-24"]);
        assert_eq!(summary.get("07-03-24").unwrap().display_total(), "12.50");
        assert_eq!(summary.get("05-03-24").unwrap().display_total(), "7.25");
    }

    #[test]
    fn test_same_day_ties_keep_storage_order() {
        let store = store_with(MemoryStore::default());
        for name in ["first", "second", "third"] {
            store
                .add(&ExpenseInput::new("2024-03-07", "1", name))
                .unwrap();
        }
        store
            .add(&ExpenseInput::new("2024-03-01", "1", "earlier"))
            .unwrap();
        assert_eq!(
            descriptions(&store.list_sorted().unwrap()),
            vec!["earlier", "first", "second", "third"]
        );
    }

    #[test]
    fn test_invalid_add_leaves_blob_unchanged() {
        let store = coffee_then_bus();
        let before = raw_blob(&store);

        let cases = [
            (ExpenseInput::new("", "1", "x"), Field::Date),
            (ExpenseInput::new("2024-03-01", "", "x"), Field::Amount),
            (ExpenseInput::new("2024-03-01", "1", ""), Field::Description),
        ];
        for (input, field) in cases {
            let err = store.add(&input).unwrap_err();
            assert!(
                matches!(err, StoreError::Validation(ValidationError::MissingField(f)) if f == field),
                "unexpected error {err:?}"
            );
            assert_eq!(raw_blob(&store), before);
        }

        assert!(matches!(
            store.add(&ExpenseInput::new("2024-04-01", "1", "future")),
            Err(StoreError::Validation(ValidationError::FutureDate { .. }))
        ));
        assert!(matches!(
            store.add(&ExpenseInput::new("2024-03-01", "-1", "refund")),
            Err(StoreError::Validation(ValidationError::NegativeAmount))
        ));
        assert_eq!(raw_blob(&store), before);
    }

    #[test]
    fn test_invalid_add_on_empty_store_writes_nothing() {
        let store = store_with(MemoryStore::default());
        assert!(store.add(&ExpenseInput::default()).is_err());
        assert_eq!(raw_blob(&store), None);
    }

    #[test]
    fn test_empty_index_selection_is_rejected_without_write() {
        let store = coffee_then_bus();
        let before = raw_blob(&store);
        assert!(matches!(
            store.delete_by_indices(Vec::new()),
            Err(StoreError::NothingSelected)
        ));
        assert!(matches!(
            store.delete_by_ids(&HashSet::new()),
            Err(StoreError::NothingSelected)
        ));
        assert_eq!(raw_blob(&store), before);
    }

    #[test]
    fn test_delete_display_index_zero_removes_earliest() {
        let store = coffee_then_bus();
        assert_eq!(store.delete_by_indices([0]).unwrap(), 1);
        assert_eq!(descriptions(&store.list_sorted().unwrap()), vec!["coffee"]);
    }

    #[test]
    fn test_delete_by_indices_ignores_out_of_range() {
        let store = coffee_then_bus();
        let before = raw_blob(&store);
        assert_eq!(store.delete_by_indices([5, 9]).unwrap(), 0);
        assert_eq!(raw_blob(&store), before);

        assert_eq!(store.delete_by_indices([1, 7]).unwrap(), 1);
        assert_eq!(descriptions(&store.list_sorted().unwrap()), vec!["bus"]);
    }

    #[test]
    fn test_delete_by_id_removes_exact_record() {
        let store = coffee_then_bus();
        let snack = store
            .add(&ExpenseInput::new("2024-03-01", "2", "snack"))
            .unwrap();

        let removed = store
            .delete_by_ids(&HashSet::from([snack.id.clone(), ExpenseId::from("missing")]))
            .unwrap();
        assert_eq!(removed, 1);

        let listed = store.list_sorted().unwrap();
        assert_eq!(descriptions(&listed), vec!["bus", "coffee"]);
        // Storage order is untouched, so the summary still leads with coffee
        assert_eq!(
            store.monthly_summary().unwrap().labels(),
            vec!["07-03-24", "05-03-24"]
        );
    }

    #[test]
    fn test_summary_accumulates_full_precision() {
        let store = store_with(MemoryStore::default());
        store
            .add(&ExpenseInput::new("2024-03-07", "10.005", "a"))
            .unwrap();
        store
            .add(&ExpenseInput::new("2024-03-07", "5.005", "b"))
            .unwrap();
        let summary = store.monthly_summary().unwrap();
        assert_eq!(summary.get("07-03-24").unwrap().display_total(), "15.01");
    }

    #[test]
    fn test_garbage_blob_is_replaced_on_add() {
        let substrate = MemoryStore::default();
        substrate.set(EXPENSES_KEY, "{{{ not json").unwrap();
        let store = store_with(substrate);

        assert!(store.list_sorted().unwrap().is_empty());
        store
            .add(&ExpenseInput::new("2024-03-07", "1", "fresh"))
            .unwrap();
        assert_eq!(descriptions(&store.list_sorted().unwrap()), vec!["fresh"]);
    }

    #[test]
    fn test_round_trip_through_reopened_backends() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("expenses.db");
        let file_dir = dir.path().join("files");

        let sqlite = ExpenseStore::new(SqliteStore::open(&db_path).unwrap()).with_clock(fixed_today);
        let files = ExpenseStore::new(FileStore::new(file_dir.clone())).with_clock(fixed_today);
        let mut added = Vec::new();
        for (date, amount, description) in [
            ("2024-03-07", "12.5", "coffee"),
            ("2024-03-05", "7.25", "bus"),
            ("2024-02-29", "0.1", "gum"),
        ] {
            let input = ExpenseInput::new(date, amount, description);
            added.push(sqlite.add(&input).unwrap());
            files.add(&input).unwrap();
        }

        let reopened = ExpenseStore::new(SqliteStore::open(&db_path).unwrap());
        let mut loaded = reopened.list_sorted().unwrap();
        loaded.sort_by(|a, b| a.id.cmp(&b.id));
        added.sort_by(|a, b| a.id.cmp(&b.id));
        assert_eq!(loaded, added);

        let reopened_files = ExpenseStore::new(FileStore::new(file_dir));
        let amounts: Vec<Decimal> = reopened_files
            .list_sorted()
            .unwrap()
            .iter()
            .map(|r| r.amount)
            .collect();
        assert_eq!(
            amounts,
            vec![
                Decimal::from_str("0.1").unwrap(),
                Decimal::from_str("7.25").unwrap(),
                Decimal::from_str("12.5").unwrap(),
            ]
        );
    }

    #[test]
    fn test_added_amount_reloads_unchanged() {
        let store = store_with(MemoryStore::default());
        for amount in ["1.000000000000000001", "79228162514264337593543950335"] {
            let added = store
                .add(&ExpenseInput::new("2024-03-07", amount, "exact"))
                .unwrap();
            let loaded = store.list_sorted().unwrap();
            let found = loaded.iter().find(|r| r.id == added.id).unwrap();
            assert_eq!(found.amount, added.amount, "amount {amount}");
        }
        assert_eq!(store.list_sorted().unwrap().len(), 2);
    }

    #[test]
    fn test_summary_overflow_is_reported_not_panicked() {
        let store = store_with(MemoryStore::default());
        for name in ["a", "b"] {
            store
                .add(&ExpenseInput::new("2024-03-07", "5e28", name))
                .unwrap();
        }
        assert_eq!(store.list_sorted().unwrap().len(), 2);
        assert!(matches!(
            store.monthly_summary(),
            Err(StoreError::TotalOverflow { .. })
        ));
    }

    #[test]
    fn test_legacy_ids_survive_delete_and_rewrite() {
        let substrate = MemoryStore::default();
        substrate
            .set(
                EXPENSES_KEY,
                r#"[{"date":"2024-03-07","amount":12.5,"description":"coffee"},
                    {"date":"2024-03-05","amount":7.25,"description":"bus"},
                    {"date":"2024-03-06","amount":3,"description":"snack"}]"#,
            )
            .unwrap();
        let store = store_with(substrate);

        let removed = store
            .delete_by_ids(&HashSet::from([ExpenseId::legacy(0)]))
            .unwrap();
        assert_eq!(removed, 1);

        // Survivors keep the ids they were loaded with, not their new positions
        let blob: serde_json::Value = serde_json::from_str(&raw_blob(&store).unwrap()).unwrap();
        let ids: Vec<&str> = blob
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["legacy-1", "legacy-2"]);

        let listed = store.list_sorted().unwrap();
        assert_eq!(descriptions(&listed), vec!["bus", "snack"]);
        assert_eq!(listed[0].id, ExpenseId::legacy(1));
        assert_eq!(listed[1].id, ExpenseId::legacy(2));

        store
            .delete_by_ids(&HashSet::from([ExpenseId::legacy(2)]))
            .unwrap();
        assert_eq!(descriptions(&store.list_sorted().unwrap()), vec!["bus"]);
    }
}
