//! Sample household used by the `--offline` and `--serve` modes.

use shared::{ApiBill, ApiBudget, ApiCategory, ApiRecurring, ApiTransaction};
use tracing::info;

use super::MemoryConnection;
use crate::backend::domain::month::MonthKey;

fn category(id: &str, name: &str, group: &str, rollover: bool, target: Option<&str>) -> ApiCategory {
    ApiCategory {
        category_id: id.to_string(),
        name: name.to_string(),
        group: Some(group.to_string()),
        icon: None,
        color: None,
        rollover,
        rollover_target_category_id: target.map(str::to_string),
        monthly_budget: None,
    }
}

fn budget(month: MonthKey, category_id: &str, limit: i64) -> ApiBudget {
    ApiBudget {
        month: month.to_string(),
        category_id: category_id.to_string(),
        limit,
        rollover: false,
        rollover_target_category_id: None,
        currency: None,
        copied_from_month: None,
        purpose: None,
        carry_forward_enabled: true,
        is_terminal: false,
        objective_id: None,
    }
}

fn expense(id: &str, date: String, merchant: &str, amount: i64, category_id: &str) -> ApiTransaction {
    ApiTransaction {
        txn_id: id.to_string(),
        date,
        merchant: Some(merchant.to_string()),
        description: None,
        amount: -amount,
        currency: None,
        category_id: Some(category_id.to_string()),
        notes: None,
        source: Some("bank".to_string()),
        account_id: None,
        receipt_id: None,
        splits: Vec::new(),
        created_at: None,
        updated_at: None,
    }
}

fn day(month: MonthKey, day: u32) -> String {
    format!("{}-{:02}", month, day)
}

impl MemoryConnection {
    /// A store seeded with categories, budgets and spend around `month`
    pub async fn with_demo_data(month: MonthKey) -> Self {
        let connection = Self::new();
        let previous = month.prev();

        for category in [
            category("groceries", "Groceries", "Living", true, None),
            category("dining", "Dining Out", "Lifestyle", true, Some("savings")),
            category("savings", "Savings", "Goals", false, None),
            category("rent", "Rent", "Living", false, None),
            category("transport", "Transport", "Living", false, None),
        ] {
            connection.insert_category(category).await;
        }

        connection.insert_budget(budget(previous, "groceries", 250_000)).await;
        connection.insert_budget(budget(previous, "dining", 80_000)).await;
        connection.insert_budget(budget(previous, "rent", 650_000)).await;
        connection.insert_budget(budget(month, "transport", 60_000)).await;
        connection.insert_budget(budget(month, "dining", 70_000)).await;

        let transactions = [
            expense("demo-1", day(previous, 3), "Lider", 92_500, "groceries"),
            expense("demo-2", day(previous, 17), "Jumbo", 61_200, "groceries"),
            expense("demo-3", day(previous, 21), "Sushi Bar", 38_000, "dining"),
            expense("demo-4", day(previous, 1), "Landlord", 650_000, "rent"),
            expense("demo-5", day(month, 2), "Landlord", 650_000, "rent"),
            expense("demo-6", day(month, 4), "Metro", 24_000, "transport"),
            expense("demo-7", day(month, 6), "Unimarc", 48_300, "groceries"),
        ];
        for transaction in transactions {
            connection.insert_transaction(transaction).await;
        }

        connection
            .insert_recurring(ApiRecurring {
                rule_id: "rule-rent".to_string(),
                name: "Rent".to_string(),
                amount: 650_000,
                currency: "CLP".to_string(),
                category_id: Some("rent".to_string()),
                cadence: "MONTHLY".to_string(),
                day_of_month: Some(1),
                start_date: day(previous, 1),
                end_date: None,
                autopost_mode: None,
                is_paused: false,
            })
            .await;
        for (id, due, status) in [("bill-rent-prev", previous, "paid"), ("bill-rent", month, "projected")] {
            connection
                .insert_bill(ApiBill {
                    bill_id: id.to_string(),
                    rule_id: Some("rule-rent".to_string()),
                    name: Some("Rent".to_string()),
                    due_date: Some(day(due, 1)),
                    amount: Some(650_000),
                    currency: Some("CLP".to_string()),
                    category_id: Some("rent".to_string()),
                    status: Some(status.to_string()),
                    linked_txn_id: None,
                })
                .await;
        }

        info!("Seeded demo store around {}", month);
        connection
    }
}
