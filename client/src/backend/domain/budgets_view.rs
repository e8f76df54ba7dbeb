//! Budgets board for one month.
//!
//! Combines the overlay month, the rollover inflows from the month before
//! and the month's spend into urgency-sorted category cards.

use rust_decimal::Decimal;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use tracing::debug;

use crate::backend::domain::budget_overlay::BudgetOverlay;
use crate::backend::domain::category_service::CategoryService;
use crate::backend::domain::commands::transactions::TransactionListQuery;
use crate::backend::domain::error::LedgerResult;
use crate::backend::domain::models::budget::Budget;
use crate::backend::domain::models::category::Category;
use crate::backend::domain::month::MonthKey;
use crate::backend::domain::rollover::{RolloverResolution, RolloverResolver};
use crate::backend::domain::spending::{spending_by_category, spent_in};
use crate::backend::domain::transaction_service::TransactionService;
use crate::backend::storage::Connection;

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryCard {
    pub category: Category,
    /// Own limit plus rollover inflow
    pub limit: Decimal,
    pub spent: Decimal,
    /// Negative when over budget
    pub remaining: Decimal,
    /// Spend as a percentage of the limit, 0 when the limit is 0
    pub percentage: Decimal,
    pub is_over_budget: bool,
    pub rollover_inflow: Decimal,
    pub purpose: Option<String>,
    pub objective_id: Option<String>,
    /// Set when the entry was carried forward or copied
    pub copied_from_month: Option<MonthKey>,
}

impl CategoryCard {
    fn ratio(&self) -> Decimal {
        if self.limit > Decimal::ZERO {
            self.spent / self.limit
        } else {
            Decimal::ZERO
        }
    }
}

/// Over budget first, then by spend ratio, then by name
fn urgency(a: &CategoryCard, b: &CategoryCard) -> Ordering {
    b.is_over_budget
        .cmp(&a.is_over_budget)
        .then_with(|| b.ratio().cmp(&a.ratio()))
        .then_with(|| a.category.name.cmp(&b.category.name))
}

#[derive(Debug, Clone, PartialEq)]
pub struct BudgetBoard {
    pub month: MonthKey,
    pub cards: Vec<CategoryCard>,
    pub total_budget: Decimal,
    pub total_spent: Decimal,
    /// The month is empty and the previous one is not
    pub can_copy_previous: bool,
}

impl BudgetBoard {
    pub fn build(
        month: MonthKey,
        categories: &[Category],
        month_budgets: &[Budget],
        previous_budgets: &[Budget],
        rollover: &RolloverResolution,
        spending: &BTreeMap<String, Decimal>,
    ) -> Self {
        let mut cards: Vec<CategoryCard> = categories
            .iter()
            .filter_map(|category| {
                let entry = month_budgets
                    .iter()
                    .find(|budget| budget.category_id == category.id);
                let inflow = rollover.inflow(&category.id);
                if entry.is_none() && inflow <= Decimal::ZERO {
                    return None;
                }

                let limit = rollover.effective_limit(month_budgets, &category.id);
                let spent = spent_in(spending, &category.id);
                let percentage = if limit > Decimal::ZERO {
                    (spent / limit * Decimal::ONE_HUNDRED).round_dp(1)
                } else {
                    Decimal::ZERO
                };

                Some(CategoryCard {
                    category: category.clone(),
                    limit,
                    spent,
                    remaining: limit - spent,
                    percentage,
                    is_over_budget: spent > limit,
                    rollover_inflow: inflow,
                    purpose: entry.and_then(|budget| budget.purpose.clone()),
                    objective_id: entry.and_then(|budget| budget.objective_id.clone()),
                    copied_from_month: entry.and_then(|budget| budget.copied_from_month),
                })
            })
            .collect();
        cards.sort_by(urgency);

        let orphaned = month_budgets
            .iter()
            .filter(|budget| !categories.iter().any(|c| c.id == budget.category_id))
            .count();
        if orphaned > 0 {
            debug!("{} budget entries in {} have no known category", orphaned, month);
        }

        Self {
            month,
            total_budget: cards.iter().map(|card| card.limit).sum(),
            total_spent: cards.iter().map(|card| card.spent).sum(),
            can_copy_previous: month_budgets.is_empty() && !previous_budgets.is_empty(),
            cards,
        }
    }

    pub fn card(&self, category_id: &str) -> Option<&CategoryCard> {
        self.cards.iter().find(|card| card.category.id == category_id)
    }

    pub fn total_remaining(&self) -> Decimal {
        self.total_budget - self.total_spent
    }
}

/// Loads everything a board needs
#[derive(Clone)]
pub struct BudgetsView<C: Connection> {
    overlay: BudgetOverlay<C>,
    categories: CategoryService<C>,
    transactions: TransactionService<C>,
}

impl<C: Connection> BudgetsView<C> {
    pub fn new(
        overlay: BudgetOverlay<C>,
        categories: CategoryService<C>,
        transactions: TransactionService<C>,
    ) -> Self {
        Self {
            overlay,
            categories,
            transactions,
        }
    }

    /// The current and previous month are fetched concurrently
    pub async fn load_board(&self, month: MonthKey, force: bool) -> LedgerResult<BudgetBoard> {
        let previous = month.prev();
        let window = TransactionListQuery {
            date_from: Some(previous.first_day()),
            date_to: Some(month.last_day()),
            ..Default::default()
        };

        let (month_budgets, previous_budgets, categories, transactions) = tokio::try_join!(
            self.overlay.fetch_month(month, force),
            self.overlay.fetch_month(previous, force),
            self.categories.load(force),
            self.transactions.load(window),
        )?;

        let rollover = RolloverResolver::resolve(
            &categories,
            &previous_budgets,
            &spending_by_category(&transactions, previous),
        );
        let spending = spending_by_category(&transactions, month);

        Ok(BudgetBoard::build(
            month,
            &categories,
            &month_budgets,
            &previous_budgets,
            &rollover,
            &spending,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::domain::commands::budgets::{CopyBudgetsCommand, UpsertBudgetCommand};
    use crate::backend::storage::test_utils::TestEnvironment;
    use rust_decimal_macros::dec;

    fn month(value: &str) -> MonthKey {
        MonthKey::parse(value).unwrap()
    }

    fn category(id: &str, name: &str) -> Category {
        Category {
            id: id.to_string(),
            name: name.to_string(),
            group: None,
            icon: None,
            color: None,
            rollover: false,
            rollover_target_category_id: None,
            default_limit: Decimal::ZERO,
        }
    }

    fn budget(category_id: &str, limit: Decimal) -> Budget {
        UpsertBudgetCommand::new(month("2026-03"), category_id, limit).to_budget("CLP".to_string())
    }

    #[test]
    fn test_cards_sorted_by_urgency() {
        let categories = vec![
            category("a", "Alpha"),
            category("b", "Bravo"),
            category("c", "Charlie"),
            category("d", "Delta"),
            category("e", "Echo"),
        ];
        let budgets = vec![
            budget("a", dec!(100)),
            budget("b", dec!(100)),
            budget("c", dec!(100)),
            budget("d", dec!(0)),
        ];
        let spending: BTreeMap<String, Decimal> = [("a", dec!(50)), ("b", dec!(150)), ("c", dec!(90)), ("d", dec!(0))]
            .into_iter()
            .map(|(id, amount)| (id.to_string(), amount))
            .collect();

        let board = BudgetBoard::build(
            month("2026-03"),
            &categories,
            &budgets,
            &[],
            &RolloverResolution::default(),
            &spending,
        );

        let order: Vec<&str> = board.cards.iter().map(|c| c.category.id.as_str()).collect();
        assert_eq!(order, vec!["b", "c", "a", "d"]);
        assert!(board.cards[0].is_over_budget);
        assert_eq!(board.cards[0].percentage, dec!(150.0));
        assert_eq!(board.card("d").unwrap().percentage, dec!(0));
        assert_eq!(board.total_budget, dec!(300));
        assert_eq!(board.total_spent, dec!(290));
        assert!(!board.can_copy_previous);
    }

    #[test]
    fn test_inflow_only_category_gets_card() {
        let categories = vec![category("savings", "Savings")];
        let mut rollover = RolloverResolution::default();
        rollover.inflows.insert("savings".to_string(), dec!(75));

        let board = BudgetBoard::build(month("2026-03"), &categories, &[], &[budget("x", dec!(1))], &rollover, &BTreeMap::new());

        assert_eq!(board.cards.len(), 1);
        assert_eq!(board.cards[0].limit, dec!(75));
        assert_eq!(board.cards[0].rollover_inflow, dec!(75));
        assert!(board.can_copy_previous);
    }

    #[tokio::test]
    async fn test_board_applies_self_rollover() {
        let env = TestEnvironment::new().await;
        env.seed_rollover_category("cat-9", "Groceries", None).await;
        env.seed_budget("2026-02", "cat-9", 500).await;
        env.seed_expense("2026-02-14", "cat-9", 120).await;
        env.seed_expense("2026-03-02", "cat-9", 40).await;

        let board = env.app.view.load_board(month("2026-03"), false).await.unwrap();

        let card = board.card("cat-9").unwrap();
        assert_eq!(card.rollover_inflow, dec!(380));
        assert_eq!(card.limit, dec!(880));
        assert_eq!(card.spent, dec!(40));
        assert_eq!(card.copied_from_month, Some(month("2026-02")));
    }

    #[tokio::test]
    async fn test_copy_previous_affordance() {
        let env = TestEnvironment::new().await;
        env.seed_category("cat-1", "Food").await;
        let mut terminal = UpsertBudgetCommand::new(month("2026-02"), "cat-1", dec!(100));
        terminal.is_terminal = true;
        env.app.budgets.upsert(terminal).await.unwrap();

        let board = env.app.view.load_board(month("2026-03"), true).await.unwrap();
        assert!(board.can_copy_previous);
        assert!(board.cards.is_empty());

        env.app
            .budgets
            .copy_from(CopyBudgetsCommand { month: month("2026-03"), source_month: month("2026-02") })
            .await
            .unwrap();
        let board = env.app.view.load_board(month("2026-03"), false).await.unwrap();
        assert!(!board.can_copy_previous);
        assert_eq!(board.card("cat-1").unwrap().limit, dec!(100));
    }
}
