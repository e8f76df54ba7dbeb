use rust_decimal::Decimal;

use crate::backend::domain::error::LedgerError;
use crate::backend::domain::month::MonthKey;

/// A month-scoped budget entry. At most one exists per `(month, category_id)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Budget {
    pub month: MonthKey,
    pub category_id: String,
    pub limit: Decimal,
    pub rollover: bool,
    pub rollover_target_category_id: Option<String>,
    pub currency: String,
    pub purpose: Option<String>,
    /// When false the entry is not used as a template for later months
    pub carry_forward_enabled: bool,
    /// When true the schedule ends after this month
    pub is_terminal: bool,
    pub objective_id: Option<String>,
    /// Set by the store when the entry was carried forward or copied
    pub copied_from_month: Option<MonthKey>,
}

impl Budget {
    pub fn is_objective_owned(&self) -> bool {
        self.objective_id.is_some()
    }

    /// Whether the store materialised this entry from an earlier month
    pub fn is_inherited(&self) -> bool {
        self.copied_from_month.is_some()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BudgetValidationError {
    #[error("Budget limit cannot be negative")]
    NegativeLimit,
    #[error("Category id cannot be empty")]
    EmptyCategory,
    #[error("A category cannot be copied onto the same month")]
    CopyOntoSelf,
}

impl From<BudgetValidationError> for LedgerError {
    fn from(error: BudgetValidationError) -> Self {
        LedgerError::Validation(error.to_string())
    }
}
