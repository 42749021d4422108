//! Per-day totals over the stored collection.
//!
//! Records are grouped by their full `DD-MM-YY` label (not by month, despite
//! the "monthly" name the view carries in the UI). Groups keep the order in
//! which each label first appears in storage order, so the table is not
//! necessarily chronological.

use std::collections::HashMap;

use rust_decimal::Decimal;

use super::error::{StoreError, StoreResult};
use super::models::{format_amount, ExpenseRecord};

/// Sum of every expense sharing one display date
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DailyTotal {
    pub date_label: String,
    /// Full-precision sum; round only through [`DailyTotal::display_total`]
    pub total: Decimal,
}

impl DailyTotal {
    pub fn display_total(&self) -> String {
        format_amount(self.total)
    }
}

/// Ordered mapping from display date to total
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DailySummary {
    totals: Vec<DailyTotal>,
}

impl DailySummary {
    /// Group `records`, which must be given in storage order.
    ///
    /// Fails with [`StoreError::TotalOverflow`] when a day's sum leaves the
    /// decimal range.
    pub fn from_records<'a>(
        records: impl IntoIterator<Item = &'a ExpenseRecord>,
    ) -> StoreResult<Self> {
        let mut totals: Vec<DailyTotal> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();

        for record in records {
            let label = record.display_date();
            match positions.get(&label) {
                Some(&idx) => {
                    let entry = &mut totals[idx];
                    entry.total = entry.total.checked_add(record.amount).ok_or_else(|| {
                        StoreError::TotalOverflow {
                            date_label: entry.date_label.clone(),
                        }
                    })?;
                }
                None => {
                    positions.insert(label.clone(), totals.len());
                    totals.push(DailyTotal {
                        date_label: label,
                        total: record.amount,
                    });
                }
            }
        }

        Ok(DailySummary { totals })
    }

    pub fn iter(&self) -> impl Iterator<Item = &DailyTotal> {
        self.totals.iter()
    }

    #[allow(dead_code)] // Used in tests
    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    #[allow(dead_code)] // Used in tests
    /// Look up the total for a `DD-MM-YY` label
    pub fn get(&self, date_label: &str) -> Option<&DailyTotal> {
        self.totals.iter().find(|t| t.date_label == date_label)
    }

    #[allow(dead_code)] // Used in tests
    /// Labels in first-seen order
    pub fn labels(&self) -> Vec<&str> {
        self.totals.iter().map(|t| t.date_label.as_str()).collect()
    }
}
