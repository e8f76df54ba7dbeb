use rust_decimal::Decimal;

use crate::backend::domain::error::LedgerError;
use crate::backend::domain::optimistic::Identified;
use crate::backend::domain::month::MonthKey;

/// A sub-allocation of a transaction to one category
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionSplit {
    pub id: String,
    pub label: String,
    pub amount: Decimal,
    pub category_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    pub id: String,
    /// `YYYY-MM-DD`
    pub date: String,
    pub merchant: Option<String>,
    pub description: Option<String>,
    /// Negative for expenses
    pub amount: Decimal,
    pub currency: String,
    pub category_id: Option<String>,
    pub notes: Option<String>,
    pub source: Option<String>,
    pub receipt_id: Option<String>,
    pub splits: Vec<TransactionSplit>,
}

impl Transaction {
    pub fn is_expense(&self) -> bool {
        self.amount.is_sign_negative() && !self.amount.is_zero()
    }

    pub fn in_month(&self, month: MonthKey) -> bool {
        month.contains_date(&self.date)
    }

    /// An expense with no category and no categorised split. Income never is.
    pub fn is_uncategorized(&self) -> bool {
        self.is_expense()
            && self.category_id.is_none()
            && !self.splits.iter().any(|split| split.category_id.is_some())
    }
}

impl Identified for Transaction {
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransactionValidationError {
    #[error("Invalid transaction date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("Transaction amount cannot be zero")]
    ZeroAmount,
    #[error("Splits add up to {splits} but the transaction amount is {amount}")]
    SplitMismatch { splits: Decimal, amount: Decimal },
}

impl From<TransactionValidationError> for LedgerError {
    fn from(error: TransactionValidationError) -> Self {
        LedgerError::Validation(error.to_string())
    }
}
