use rust_decimal::Decimal;
use std::fmt;

use crate::backend::domain::error::{LedgerError, LedgerResult};

#[derive(Debug, Clone, PartialEq)]
pub struct RecurringPayment {
    pub id: String,
    pub name: String,
    pub amount: Decimal,
    pub currency: String,
    pub category_id: Option<String>,
    /// `MONTHLY` or `WEEKLY`
    pub cadence: String,
    pub day_of_month: Option<u32>,
    pub start_date: String,
    pub end_date: Option<String>,
    pub autopost_mode: Option<String>,
    pub paused: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum RecurringValidationError {
    #[error("Recurring rule name cannot be empty")]
    EmptyName,
    #[error("Unknown cadence '{0}', expected MONTHLY or WEEKLY")]
    UnknownCadence(String),
    #[error("Day of month {0} is outside 1-31")]
    InvalidDayOfMonth(u32),
    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("End date {end} is before start date {start}")]
    EndBeforeStart { start: String, end: String },
}

impl From<RecurringValidationError> for LedgerError {
    fn from(error: RecurringValidationError) -> Self {
        LedgerError::Validation(error.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BillStatus {
    Projected,
    Paid,
    Skipped,
}

impl BillStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BillStatus::Projected => "projected",
            BillStatus::Paid => "paid",
            BillStatus::Skipped => "skipped",
        }
    }

    pub fn from_string(value: &str) -> LedgerResult<Self> {
        match value.to_ascii_lowercase().as_str() {
            "projected" => Ok(BillStatus::Projected),
            "paid" => Ok(BillStatus::Paid),
            "skipped" => Ok(BillStatus::Skipped),
            other => Err(LedgerError::validation(format!("Unknown bill status: {}", other))),
        }
    }
}

impl fmt::Display for BillStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A generated due-date instance of a recurring payment
#[derive(Debug, Clone, PartialEq)]
pub struct BillInstance {
    pub id: String,
    pub rule_id: Option<String>,
    pub name: Option<String>,
    pub due_date: Option<String>,
    pub amount: Option<Decimal>,
    pub currency: String,
    pub category_id: Option<String>,
    pub status: BillStatus,
    pub linked_transaction_id: Option<String>,
}
