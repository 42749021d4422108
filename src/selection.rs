//! Ledger row selection state.
//!
//! Tracks which expenses are checked for deletion. Rows are remembered by
//! their stable id rather than their position, so a re-sort or refresh of the
//! ledger never shifts a check mark onto a different expense.

use std::collections::HashSet;

use crate::data::ExpenseId;

/// Set of checked ledger rows
#[derive(Debug, Default)]
pub struct SelectionState {
    marked: HashSet<ExpenseId>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle an expense's check mark. Returns true if it is now checked.
    pub fn toggle(&mut self, id: &ExpenseId) -> bool {
        if self.marked.remove(id) {
            false
        } else {
            self.marked.insert(id.clone());
            true
        }
    }

    pub fn is_marked(&self, id: &ExpenseId) -> bool {
        self.marked.contains(id)
    }

    /// Ids currently checked
    pub fn marked(&self) -> &HashSet<ExpenseId> {
        &self.marked
    }

    pub fn is_empty(&self) -> bool {
        self.marked.is_empty()
    }

    pub fn len(&self) -> usize {
        self.marked.len()
    }

    pub fn clear(&mut self) {
        self.marked.clear();
    }

    /// Forget ids that no longer exist in the ledger
    pub fn retain_existing<'a>(&mut self, ids: impl IntoIterator<Item = &'a ExpenseId>) {
        let existing: HashSet<&ExpenseId> = ids.into_iter().collect();
        self.marked.retain(|id| existing.contains(id));
    }
}
