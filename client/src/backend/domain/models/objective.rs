use rust_decimal::Decimal;
use shared::{ObjectiveStatus, PlanKind};
use std::collections::BTreeSet;

use crate::backend::domain::error::LedgerError;
use crate::backend::domain::optimistic::Identified;
use crate::backend::domain::month::MonthKey;

/// One month of an objective's funding schedule
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectiveMonthPlan {
    pub month: MonthKey,
    pub amount: Decimal,
    /// Informational only; both kinds claim the same budget slot
    pub kind: PlanKind,
    pub is_last_month: bool,
}

/// A savings or spend-down goal materialised into the budget overlay
#[derive(Debug, Clone, PartialEq)]
pub struct Objective {
    pub id: String,
    pub name: String,
    pub category_id: String,
    pub currency: String,
    pub total_amount: Option<Decimal>,
    pub status: ObjectiveStatus,
    /// Ascending by month, unique per month
    pub plans: Vec<ObjectiveMonthPlan>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl Objective {
    pub fn plan_months(&self) -> BTreeSet<MonthKey> {
        self.plans.iter().map(|plan| plan.month).collect()
    }

    pub fn planned_total(&self) -> Decimal {
        self.plans.iter().map(|plan| plan.amount).sum()
    }

    pub fn is_active(&self) -> bool {
        self.status == ObjectiveStatus::Active
    }
}

/// How an objective gets its category
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectiveCategory {
    Explicit(String),
    /// The store creates, or reuses, a category named after the objective
    AutoCreateByName,
}

impl ObjectiveCategory {
    pub fn explicit_id(&self) -> Option<&str> {
        match self {
            ObjectiveCategory::Explicit(id) => Some(id.as_str()),
            ObjectiveCategory::AutoCreateByName => None,
        }
    }
}

impl Identified for Objective {
    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ObjectiveValidationError {
    #[error("Objective name cannot be empty")]
    EmptyName,
    #[error("Objective needs at least one month plan")]
    EmptyPlans,
    #[error("Month {0} is planned more than once")]
    DuplicateMonth(MonthKey),
    #[error("Planned amount for {0} cannot be negative")]
    NegativePlanAmount(MonthKey),
    #[error("Total amount cannot be negative")]
    NegativeTotal,
    #[error("Category id cannot be empty")]
    EmptyCategory,
    #[error("Only active objectives can be completed (status is {0})")]
    NotActive(ObjectiveStatus),
    #[error("Archived objectives cannot be changed")]
    Archived,
}

impl From<ObjectiveValidationError> for LedgerError {
    fn from(error: ObjectiveValidationError) -> Self {
        LedgerError::Validation(error.to_string())
    }
}
