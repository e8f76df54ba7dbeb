//! Spending aggregation per category.

use rust_decimal::Decimal;
use std::collections::BTreeMap;

use crate::backend::domain::models::transaction::Transaction;
use crate::backend::domain::month::MonthKey;

/// Amount spent per category in `month`.
///
/// Only expenses count, as positive amounts. A split transaction contributes
/// its categorised splits instead of the parent; splits without a category
/// and income are ignored.
pub fn spending_by_category(transactions: &[Transaction], month: MonthKey) -> BTreeMap<String, Decimal> {
    let mut spent: BTreeMap<String, Decimal> = BTreeMap::new();

    for transaction in transactions.iter().filter(|t| t.in_month(month) && t.is_expense()) {
        if transaction.splits.is_empty() {
            if let Some(category_id) = &transaction.category_id {
                *spent.entry(category_id.clone()).or_default() += transaction.amount.abs();
            }
            continue;
        }

        for split in &transaction.splits {
            if let Some(category_id) = &split.category_id {
                *spent.entry(category_id.clone()).or_default() += split.amount.abs();
            }
        }
    }

    spent
}

/// Spend for one category, zero when it has none
pub fn spent_in(spending: &BTreeMap<String, Decimal>, category_id: &str) -> Decimal {
    spending.get(category_id).copied().unwrap_or_default()
}
