//! Non-interactive subcommands printing plain-text views.

use std::collections::HashSet;
use std::io::Write;

use anyhow::{Context, Result};

use crate::data::{
    DailySummary, ExpenseId, ExpenseInput, ExpenseRecord, ExpenseStore, KeyValueStore, StoreError,
};

/// Record one expense and echo it back
pub fn add<S: KeyValueStore>(
    store: &ExpenseStore<S>,
    input: &ExpenseInput,
    out: &mut impl Write,
) -> Result<()> {
    let record = store.add(input).context("Expense was not added")?;
    writeln!(
        out,
        "Added {} {} {} ({})",
        record.display_date(),
        record.display_amount(),
        record.description,
        record.id
    )?;
    Ok(())
}

/// Print the date-sorted ledger with positions usable by `delete`
pub fn list<S: KeyValueStore>(store: &ExpenseStore<S>, out: &mut impl Write) -> Result<()> {
    let records = store.list_sorted()?;
    write_ledger(&records, out)
}

fn write_ledger(records: &[ExpenseRecord], out: &mut impl Write) -> Result<()> {
    if records.is_empty() {
        writeln!(out, "No expenses recorded.")?;
        return Ok(());
    }
    writeln!(out, "{:>4}  {:<8}  {:>12}  {:<30}  ID", "#", "Date", "Amount", "Description")?;
    for (idx, record) in records.iter().enumerate() {
        writeln!(
            out,
            "{:>4}  {:<8}  {:>12}  {:<30}  {}",
            idx,
            record.display_date(),
            record.display_amount(),
            record.description,
            record.id
        )?;
    }
    Ok(())
}

/// Delete by ledger position or by id
pub fn delete<S: KeyValueStore>(
    store: &ExpenseStore<S>,
    indices: &[usize],
    ids: &[String],
    out: &mut impl Write,
) -> Result<()> {
    let result = if ids.is_empty() {
        store.delete_by_indices(indices.iter().copied())
    } else {
        let ids: HashSet<ExpenseId> = ids.iter().map(|id| ExpenseId::from(id.as_str())).collect();
        store.delete_by_ids(&ids)
    };

    match result {
        Ok(0) => writeln!(out, "No matching expenses found.")?,
        Ok(removed) => writeln!(out, "Deleted {removed} expense(s).")?,
        Err(StoreError::NothingSelected) => {
            anyhow::bail!("No expenses selected for deletion.")
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

/// Print per-day totals
pub fn summary<S: KeyValueStore>(store: &ExpenseStore<S>, out: &mut impl Write) -> Result<()> {
    let summary = store.monthly_summary()?;
    write_summary(&summary, out)
}

fn write_summary(summary: &DailySummary, out: &mut impl Write) -> Result<()> {
    if summary.is_empty() {
        writeln!(out, "No expenses recorded.")?;
        return Ok(());
    }
    writeln!(out, "{:<8}  {:>12}", "Date", "Total")?;
    for total in summary.iter() {
        writeln!(out, "{:<8}  {:>12}", total.date_label, total.display_total())?;
    }
    Ok(())
}
