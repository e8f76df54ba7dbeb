//! Rollover Resolver.
//!
//! Rollover is a flow between category budgets across a month boundary, not a
//! stored balance. It is recomputed from the previous month's limits and
//! spend every time a month is viewed:
//!
//! 1. `surplus(C) = max(0, prior_limit(C) - prior_spent(C))`, where the prior
//!    limit is the previous month's overlay entry, or the category's default
//!    limit when there is none.
//! 2. Every category with rollover enabled routes its surplus to its target.
//!    A category without a target keeps the surplus itself.
//! 3. `effective_limit(M, C) = entry(M, C).limit + inflow(C)`, or just the
//!    inflow when `C` has no entry in `M`.

use rust_decimal::Decimal;
use std::collections::BTreeMap;

use crate::backend::domain::models::budget::Budget;
use crate::backend::domain::models::category::Category;
use crate::backend::domain::spending::spent_in;

/// Surplus per source category and inflow per destination category
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RolloverResolution {
    pub surpluses: BTreeMap<String, Decimal>,
    pub inflows: BTreeMap<String, Decimal>,
}

impl RolloverResolution {
    pub fn surplus(&self, category_id: &str) -> Decimal {
        self.surpluses.get(category_id).copied().unwrap_or_default()
    }

    pub fn inflow(&self, category_id: &str) -> Decimal {
        self.inflows.get(category_id).copied().unwrap_or_default()
    }

    pub fn total_inflow(&self) -> Decimal {
        self.inflows.values().copied().sum()
    }

    /// Limit for `category_id` in the month whose entries are `month_budgets`
    pub fn effective_limit(&self, month_budgets: &[Budget], category_id: &str) -> Decimal {
        let own = month_budgets
            .iter()
            .find(|budget| budget.category_id == category_id)
            .map(|budget| budget.limit)
            .unwrap_or_default();
        own + self.inflow(category_id)
    }
}

pub struct RolloverResolver;

impl RolloverResolver {
    /// Resolve the inflows a month receives from the month before it
    pub fn resolve(
        categories: &[Category],
        previous_budgets: &[Budget],
        previous_spending: &BTreeMap<String, Decimal>,
    ) -> RolloverResolution {
        let mut resolution = RolloverResolution::default();

        for category in categories {
            let prior_limit = previous_budgets
                .iter()
                .find(|budget| budget.category_id == category.id)
                .map(|budget| budget.limit)
                .unwrap_or(category.default_limit);
            let surplus = (prior_limit - spent_in(previous_spending, &category.id)).max(Decimal::ZERO);
            resolution.surpluses.insert(category.id.clone(), surplus);

            if let Some(destination) = category.rollover_destination() {
                if surplus > Decimal::ZERO {
                    *resolution.inflows.entry(destination.to_string()).or_default() += surplus;
                }
            }
        }

        resolution
    }
}
