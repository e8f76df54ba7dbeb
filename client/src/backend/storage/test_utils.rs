//! Seeded in-memory environment for service tests.

use shared::{ApiBill, ApiBudget, ApiCategory, ApiRecurring, ApiTransaction};
use std::sync::Arc;
use uuid::Uuid;

use crate::backend::domain::money::MoneyService;
use crate::backend::storage::MemoryConnection;
use crate::backend::AppState;

/// A fresh in-memory store plus an [`AppState`] wired to it.
///
/// Amounts passed to the `seed_*` helpers are in minor units of the default
/// currency (CLP, so whole pesos).
pub struct TestEnvironment {
    pub connection: MemoryConnection,
    pub app: AppState<MemoryConnection>,
}

impl TestEnvironment {
    pub async fn new() -> Self {
        let connection = MemoryConnection::new();
        let app = AppState::new(Arc::new(connection.clone()), MoneyService::default());
        TestEnvironment { connection, app }
    }

    /// Store an explicit, carried-forward budget entry
    pub async fn seed_budget(&self, month: &str, category_id: &str, limit: i64) {
        self.connection
            .insert_budget(ApiBudget {
                month: month.to_string(),
                category_id: category_id.to_string(),
                limit,
                rollover: false,
                rollover_target_category_id: None,
                currency: Some("CLP".to_string()),
                copied_from_month: None,
                purpose: None,
                carry_forward_enabled: true,
                is_terminal: false,
                objective_id: None,
            })
            .await;
    }

    pub async fn seed_category(&self, category_id: &str, name: &str) {
        self.connection.insert_category(category(category_id, name, false, None)).await;
    }

    /// A category with rollover on; `None` keeps the surplus in the category
    pub async fn seed_rollover_category(&self, category_id: &str, name: &str, target: Option<&str>) {
        self.connection.insert_category(category(category_id, name, true, target)).await;
    }

    pub async fn seed_expense(&self, date: &str, category_id: &str, amount: i64) {
        self.connection
            .insert_transaction(ApiTransaction {
                txn_id: Uuid::new_v4().to_string(),
                date: date.to_string(),
                merchant: None,
                description: None,
                amount: -amount,
                currency: Some("CLP".to_string()),
                category_id: Some(category_id.to_string()),
                notes: None,
                source: Some("bank".to_string()),
                account_id: None,
                receipt_id: None,
                splits: Vec::new(),
                created_at: None,
                updated_at: None,
            })
            .await;
    }

    pub async fn seed_recurring(&self, rule_id: &str, name: &str, paused: bool) {
        self.connection
            .insert_recurring(ApiRecurring {
                rule_id: rule_id.to_string(),
                name: name.to_string(),
                amount: 100_000,
                currency: "CLP".to_string(),
                category_id: None,
                cadence: "MONTHLY".to_string(),
                day_of_month: Some(1),
                start_date: "2026-01-01".to_string(),
                end_date: None,
                autopost_mode: None,
                is_paused: paused,
            })
            .await;
    }

    /// A projected bill
    pub async fn seed_bill(&self, bill_id: &str, due_date: &str, amount: i64) {
        self.connection
            .insert_bill(ApiBill {
                bill_id: bill_id.to_string(),
                rule_id: None,
                name: Some(bill_id.to_string()),
                due_date: Some(due_date.to_string()),
                amount: Some(amount),
                currency: Some("CLP".to_string()),
                category_id: None,
                status: Some("projected".to_string()),
                linked_txn_id: None,
            })
            .await;
    }
}

fn category(category_id: &str, name: &str, rollover: bool, target: Option<&str>) -> ApiCategory {
    ApiCategory {
        category_id: category_id.to_string(),
        name: name.to_string(),
        group: None,
        icon: None,
        color: None,
        rollover,
        rollover_target_category_id: target.map(str::to_string),
        monthly_budget: None,
    }
}
