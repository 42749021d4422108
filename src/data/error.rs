//! Error types surfaced by the expense store.

use std::fmt;

use chrono::NaiveDate;
use thiserror::Error;

/// Form fields an expense is built from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Date,
    Amount,
    Description,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::Date => "date",
            Field::Amount => "amount",
            Field::Description => "description",
        };
        f.write_str(name)
    }
}

/// Rejected user input. Nothing is read or written when one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing required field: {0}")]
    MissingField(Field),

    #[error("amount is not a number: {0:?}")]
    InvalidAmount(String),

    #[error("amount must not be negative")]
    NegativeAmount,

    #[error("date is not a valid YYYY-MM-DD calendar date: {0:?}")]
    InvalidDate(String),

    #[error("date {date} is later than today ({today})")]
    FutureDate { date: NaiveDate, today: NaiveDate },
}

/// Errors returned by [`super::ExpenseStore`] operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Deletion requested with an empty selection
    #[error("nothing selected")]
    NothingSelected,

    /// Same-day amounts sum past the largest representable decimal
    #[error("total for {date_label} is too large to compute")]
    TotalOverflow { date_label: String },

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
