//! Domain-level command and query types
//! These structs are the inputs of the ledger services. Callers (the binary,
//! a UI shell, tests) build them directly; the REST layer never sees them.

pub mod budgets {
    use rust_decimal::Decimal;
    use shared::BudgetDeleteScope;

    use crate::backend::domain::models::budget::{Budget, BudgetValidationError};
    use crate::backend::domain::month::MonthKey;

    /// Input for creating or replacing the budget entry of one month/category.
    #[derive(Debug, Clone)]
    pub struct UpsertBudgetCommand {
        pub month: MonthKey,
        pub category_id: String,
        pub limit: Decimal,
        pub rollover: bool,
        pub rollover_target_category_id: Option<String>,
        /// Falls back to the configured default currency
        pub currency: Option<String>,
        pub purpose: Option<String>,
        pub carry_forward_enabled: bool,
        pub is_terminal: bool,
        pub objective_id: Option<String>,
        /// Also overwrite the category's explicit entries in later months
        pub apply_to_future: bool,
    }

    impl UpsertBudgetCommand {
        /// A plain carried-forward budget with everything else defaulted
        pub fn new(month: MonthKey, category_id: impl Into<String>, limit: Decimal) -> Self {
            Self {
                month,
                category_id: category_id.into(),
                limit,
                rollover: false,
                rollover_target_category_id: None,
                currency: None,
                purpose: None,
                carry_forward_enabled: true,
                is_terminal: false,
                objective_id: None,
                apply_to_future: false,
            }
        }

        pub fn validate(&self) -> Result<(), BudgetValidationError> {
            if self.category_id.trim().is_empty() {
                return Err(BudgetValidationError::EmptyCategory);
            }
            if self.limit.is_sign_negative() && !self.limit.is_zero() {
                return Err(BudgetValidationError::NegativeLimit);
            }
            Ok(())
        }

        pub fn to_budget(&self, currency: String) -> Budget {
            Budget {
                month: self.month,
                category_id: self.category_id.clone(),
                limit: self.limit,
                rollover: self.rollover,
                rollover_target_category_id: self.rollover_target_category_id.clone(),
                currency,
                purpose: self.purpose.clone(),
                carry_forward_enabled: self.carry_forward_enabled,
                is_terminal: self.is_terminal,
                objective_id: self.objective_id.clone(),
                copied_from_month: None,
            }
        }
    }

    /// Input for a scoped budget deletion.
    #[derive(Debug, Clone)]
    pub struct DeleteBudgetCommand {
        pub category_id: String,
        pub scope: BudgetDeleteScope,
        pub month: MonthKey,
    }

    /// Input for seeding a month from another month's budgets.
    #[derive(Debug, Clone, Copy)]
    pub struct CopyBudgetsCommand {
        pub month: MonthKey,
        pub source_month: MonthKey,
    }
}

pub mod objectives {
    use rust_decimal::Decimal;

    use crate::backend::domain::models::objective::{ObjectiveCategory, ObjectiveMonthPlan};

    /// Input for creating a new objective.
    #[derive(Debug, Clone)]
    pub struct CreateObjectiveCommand {
        pub name: String,
        pub category: ObjectiveCategory,
        pub currency: Option<String>,
        pub total_amount: Option<Decimal>,
        pub plans: Vec<ObjectiveMonthPlan>,
        /// Replace conflicting budget entries instead of failing
        pub force: bool,
    }

    /// Input for updating an objective; `None` fields are left unchanged.
    #[derive(Debug, Clone, Default)]
    pub struct UpdateObjectiveCommand {
        pub name: Option<String>,
        pub category_id: Option<String>,
        pub currency: Option<String>,
        pub total_amount: Option<Decimal>,
        pub plans: Option<Vec<ObjectiveMonthPlan>>,
        pub force: bool,
    }
}

pub mod categories {
    use rust_decimal::Decimal;

    use crate::backend::domain::models::category::CategoryValidationError;

    /// Input for creating a category.
    #[derive(Debug, Clone)]
    pub struct CreateCategoryCommand {
        pub name: String,
        pub group: Option<String>,
        pub icon: Option<String>,
        pub color: Option<String>,
        pub rollover: bool,
        pub rollover_target_category_id: Option<String>,
        pub default_limit: Decimal,
    }

    impl CreateCategoryCommand {
        pub fn validate(&self) -> Result<(), CategoryValidationError> {
            if self.name.trim().is_empty() {
                return Err(CategoryValidationError::EmptyName);
            }
            if self.default_limit.is_sign_negative() && !self.default_limit.is_zero() {
                return Err(CategoryValidationError::NegativeDefaultLimit);
            }
            Ok(())
        }
    }

    /// Input for patching a category; `None` fields are left unchanged.
    #[derive(Debug, Clone, Default)]
    pub struct UpdateCategoryCommand {
        pub name: Option<String>,
        pub group: Option<String>,
        pub icon: Option<String>,
        pub color: Option<String>,
        pub rollover: Option<bool>,
        /// `Some(None)` clears the target so the category keeps its own surplus
        pub rollover_target_category_id: Option<Option<String>>,
        pub default_limit: Option<Decimal>,
    }

    impl UpdateCategoryCommand {
        pub fn validate(&self) -> Result<(), CategoryValidationError> {
            if matches!(&self.name, Some(name) if name.trim().is_empty()) {
                return Err(CategoryValidationError::EmptyName);
            }
            if matches!(self.default_limit, Some(limit) if limit.is_sign_negative() && !limit.is_zero()) {
                return Err(CategoryValidationError::NegativeDefaultLimit);
            }
            Ok(())
        }
    }
}

pub mod recurring {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use crate::backend::domain::models::recurring::RecurringValidationError;

    /// Input for creating a recurring rule, also the full replacement body
    /// when updating one.
    #[derive(Debug, Clone)]
    pub struct SaveRecurringCommand {
        pub name: String,
        /// Signed like a transaction; bills are negative
        pub amount: Decimal,
        pub currency: Option<String>,
        pub category_id: Option<String>,
        pub cadence: String,
        pub day_of_month: Option<u32>,
        pub start_date: String,
        pub end_date: Option<String>,
        pub autopost_mode: Option<String>,
        pub paused: bool,
    }

    impl SaveRecurringCommand {
        pub fn validate(&self) -> Result<(), RecurringValidationError> {
            if self.name.trim().is_empty() {
                return Err(RecurringValidationError::EmptyName);
            }
            if !matches!(self.cadence.as_str(), "MONTHLY" | "WEEKLY") {
                return Err(RecurringValidationError::UnknownCadence(self.cadence.clone()));
            }
            if let Some(day) = self.day_of_month {
                if !(1..=31).contains(&day) {
                    return Err(RecurringValidationError::InvalidDayOfMonth(day));
                }
            }
            let start = NaiveDate::parse_from_str(&self.start_date, "%Y-%m-%d")
                .map_err(|_| RecurringValidationError::InvalidDate(self.start_date.clone()))?;
            if let Some(end_date) = &self.end_date {
                let end = NaiveDate::parse_from_str(end_date, "%Y-%m-%d")
                    .map_err(|_| RecurringValidationError::InvalidDate(end_date.clone()))?;
                if end < start {
                    return Err(RecurringValidationError::EndBeforeStart {
                        start: self.start_date.clone(),
                        end: end_date.clone(),
                    });
                }
            }
            Ok(())
        }
    }
}

pub mod transactions {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use crate::backend::domain::models::transaction::{TransactionSplit, TransactionValidationError};

    /// Input for creating a transaction, also used as the full replacement
    /// body when updating one.
    #[derive(Debug, Clone)]
    pub struct SaveTransactionCommand {
        pub date: String,
        pub merchant: Option<String>,
        pub description: Option<String>,
        pub amount: Decimal,
        pub currency: Option<String>,
        pub category_id: Option<String>,
        pub notes: Option<String>,
        pub receipt_id: Option<String>,
        pub splits: Vec<TransactionSplit>,
    }

    impl SaveTransactionCommand {
        /// Splits, when present, must account for the whole amount
        pub fn validate(&self) -> Result<(), TransactionValidationError> {
            if NaiveDate::parse_from_str(&self.date, "%Y-%m-%d").is_err() {
                return Err(TransactionValidationError::InvalidDate(self.date.clone()));
            }
            if self.amount.is_zero() {
                return Err(TransactionValidationError::ZeroAmount);
            }
            if !self.splits.is_empty() {
                let splits: Decimal = self.splits.iter().map(|split| split.amount.abs()).sum();
                if splits != self.amount.abs() {
                    return Err(TransactionValidationError::SplitMismatch {
                        splits,
                        amount: self.amount.abs(),
                    });
                }
            }
            Ok(())
        }
    }

    /// Query parameters for listing transactions.
    #[derive(Debug, Clone, Default)]
    pub struct TransactionListQuery {
        pub date_from: Option<String>,
        pub date_to: Option<String>,
        pub category_id: Option<String>,
        pub limit: Option<u32>,
    }
}
