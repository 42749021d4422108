//! Data models representing expense records.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::{Field, ValidationError};

/// Format of dates typed by the user and persisted in the store
pub const INPUT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Format of dates shown in tables and used as the daily summary key
const DISPLAY_DATE_FORMAT: &str = "%d-%m-%y";

/// Decimal places amounts are rounded to for display
const DISPLAY_DECIMALS: u32 = 2;

/// Stable opaque identifier of an expense record
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpenseId(String);

impl ExpenseId {
    /// Generate a fresh random id
    pub fn generate() -> Self {
        ExpenseId(Uuid::new_v4().to_string())
    }

    /// Id for a record stored without one, derived from its storage position
    pub fn legacy(position: usize) -> Self {
        ExpenseId(format!("legacy-{position}"))
    }

    #[allow(dead_code)] // Used in tests
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ExpenseId {
    fn from(value: &str) -> Self {
        ExpenseId(value.to_string())
    }
}

impl From<String> for ExpenseId {
    fn from(value: String) -> Self {
        ExpenseId(value)
    }
}

impl fmt::Display for ExpenseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single expense entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpenseRecord {
    pub id: ExpenseId,
    pub date: NaiveDate,
    pub amount: Decimal,
    pub description: String,
}

impl ExpenseRecord {
    /// Create a record with a freshly generated id
    pub fn new(date: NaiveDate, amount: Decimal, description: String) -> Self {
        ExpenseRecord {
            id: ExpenseId::generate(),
            date,
            amount,
            description,
        }
    }

    /// Date formatted for tables (`DD-MM-YY`)
    pub fn display_date(&self) -> String {
        format_display_date(self.date)
    }

    /// Amount rounded to two decimals for tables
    pub fn display_amount(&self) -> String {
        format_amount(self.amount)
    }
}

/// Raw expense fields exactly as entered by the user
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpenseInput {
    pub date: String,
    pub amount: String,
    pub description: String,
}

/// Expense fields that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidExpense {
    pub date: NaiveDate,
    pub amount: Decimal,
    pub description: String,
}

impl ExpenseInput {
    pub fn new(
        date: impl Into<String>,
        amount: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        ExpenseInput {
            date: date.into(),
            amount: amount.into(),
            description: description.into(),
        }
    }

    /// Check every field, in form order. `today` bounds the date from above.
    pub fn validate(&self, today: NaiveDate) -> Result<ValidExpense, ValidationError> {
        let date = self.date.trim();
        let amount = self.amount.trim();
        if date.is_empty() {
            return Err(ValidationError::MissingField(Field::Date));
        }
        if amount.is_empty() {
            return Err(ValidationError::MissingField(Field::Amount));
        }
        if self.description.trim().is_empty() {
            return Err(ValidationError::MissingField(Field::Description));
        }

        let date = NaiveDate::parse_from_str(date, INPUT_DATE_FORMAT)
            .map_err(|_| ValidationError::InvalidDate(date.to_string()))?;
        if date > today {
            return Err(ValidationError::FutureDate { date, today });
        }

        let amount = parse_amount(amount)
            .ok_or_else(|| ValidationError::InvalidAmount(amount.to_string()))?;
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(ValidationError::NegativeAmount);
        }

        Ok(ValidExpense {
            date,
            amount,
            // Stored verbatim
            description: self.description.clone(),
        })
    }
}

/// Parse a decimal amount, accepting plain (`12.5`) and scientific (`1.25e1`) notation
pub fn parse_amount(text: &str) -> Option<Decimal> {
    let text = text.trim();
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}

/// Format a calendar date as `DD-MM-YY`.
///
/// Works on the calendar fields directly, so the result never shifts with the
/// host timezone.
pub fn format_display_date(date: NaiveDate) -> String {
    date.format(DISPLAY_DATE_FORMAT).to_string()
}

/// Format an amount with exactly two decimals, rounding half away from zero
pub fn format_amount(amount: Decimal) -> String {
    let rounded =
        amount.round_dp_with_strategy(DISPLAY_DECIMALS, RoundingStrategy::MidpointAwayFromZero);
    format!("{rounded:.2}")
}
