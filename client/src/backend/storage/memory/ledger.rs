use async_trait::async_trait;
use chrono::NaiveDate;
use shared::{
    ApiBill, ApiCategory, ApiRecurring, ApiRecurringToggle, ApiTransaction, BillUpdatePayload,
    CategoryPayload, DeletedResponse, RecurringPayload, TransactionListRequest, TransactionPayload,
};
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{now_timestamp, MemoryState};
use crate::backend::domain::error::{LedgerError, LedgerResult};
use crate::backend::storage::traits::{CategoryStorage, RecurringStorage, TransactionStorage};

const BILL_STATUSES: [&str; 3] = ["projected", "paid", "skipped"];
const CADENCES: [&str; 2] = ["MONTHLY", "WEEKLY"];

fn require_date(date: &str) -> LedgerResult<()> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| LedgerError::validation(format!("invalid date '{}'", date)))
}

fn validate_rule(payload: &RecurringPayload) -> LedgerResult<()> {
    if payload.name.trim().is_empty() {
        return Err(LedgerError::validation("recurring rule name cannot be empty"));
    }
    if !CADENCES.contains(&payload.cadence.as_str()) {
        return Err(LedgerError::validation(format!("unknown cadence '{}'", payload.cadence)));
    }
    require_date(&payload.start_date)?;
    if let Some(end_date) = &payload.end_date {
        require_date(end_date)?;
    }
    Ok(())
}

fn rule_from_payload(rule_id: String, payload: &RecurringPayload) -> ApiRecurring {
    ApiRecurring {
        rule_id,
        name: payload.name.trim().to_string(),
        amount: payload.amount,
        currency: payload.currency.clone(),
        category_id: payload.category_id.clone(),
        cadence: payload.cadence.clone(),
        day_of_month: payload.day_of_month,
        start_date: payload.start_date.clone(),
        end_date: payload.end_date.clone(),
        autopost_mode: payload.autopost_mode.clone(),
        is_paused: payload.is_paused,
    }
}

fn toggle(rule: &ApiRecurring) -> ApiRecurringToggle {
    ApiRecurringToggle {
        rule_id: rule.rule_id.clone(),
        is_paused: rule.is_paused,
        end_date: rule.end_date.clone(),
    }
}

fn deleted() -> DeletedResponse {
    DeletedResponse {
        deleted: true,
        count: None,
    }
}

#[derive(Clone)]
pub struct MemoryCategoryRepository {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryCategoryRepository {
    pub fn new(state: Arc<Mutex<MemoryState>>) -> Self {
        Self { state }
    }
}

#[async_trait]
impl CategoryStorage for MemoryCategoryRepository {
    async fn list_categories(&self) -> LedgerResult<Vec<ApiCategory>> {
        let mut state = self.state.lock().await;
        state.check_failure()?;
        let mut categories = state.categories.clone();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(categories)
    }

    async fn create_category(&self, payload: &CategoryPayload) -> LedgerResult<ApiCategory> {
        let mut state = self.state.lock().await;
        state.check_failure()?;
        let name = payload
            .name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| LedgerError::validation("name is required"))?;

        let category = ApiCategory {
            category_id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            group: payload.group.clone(),
            icon: payload.icon.clone(),
            color: payload.color.clone(),
            rollover: payload.rollover.unwrap_or(false),
            rollover_target_category_id: payload.rollover_target_category_id.clone().flatten(),
            monthly_budget: payload.monthly_budget,
        };
        state.categories.push(category.clone());
        Ok(category)
    }

    async fn update_category(&self, category_id: &str, payload: &CategoryPayload) -> LedgerResult<ApiCategory> {
        let mut state = self.state.lock().await;
        state.check_failure()?;
        let category = state
            .categories
            .iter_mut()
            .find(|c| c.category_id == category_id)
            .ok_or_else(|| LedgerError::not_found(format!("Category {}", category_id)))?;

        if let Some(name) = &payload.name {
            category.name = name.clone();
        }
        if payload.group.is_some() {
            category.group = payload.group.clone();
        }
        if payload.icon.is_some() {
            category.icon = payload.icon.clone();
        }
        if payload.color.is_some() {
            category.color = payload.color.clone();
        }
        if let Some(rollover) = payload.rollover {
            category.rollover = rollover;
        }
        if let Some(target) = &payload.rollover_target_category_id {
            category.rollover_target_category_id = target.clone();
        }
        if payload.monthly_budget.is_some() {
            category.monthly_budget = payload.monthly_budget;
        }
        Ok(category.clone())
    }

    async fn delete_category(&self, category_id: &str) -> LedgerResult<DeletedResponse> {
        let mut state = self.state.lock().await;
        state.check_failure()?;
        let before = state.categories.len();
        state.categories.retain(|c| c.category_id != category_id);
        if state.categories.len() == before {
            return Err(LedgerError::not_found(format!("Category {}", category_id)));
        }
        Ok(deleted())
    }
}

#[derive(Clone)]
pub struct MemoryTransactionRepository {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryTransactionRepository {
    pub fn new(state: Arc<Mutex<MemoryState>>) -> Self {
        Self { state }
    }
}

fn matches_request(transaction: &ApiTransaction, request: &TransactionListRequest) -> bool {
    if matches!(&request.date_from, Some(from) if transaction.date.as_str() < from.as_str()) {
        return false;
    }
    if matches!(&request.date_to, Some(to) if transaction.date.as_str() > to.as_str()) {
        return false;
    }
    match &request.category_id {
        Some(category_id) => {
            transaction.category_id.as_ref() == Some(category_id)
                || transaction
                    .splits
                    .iter()
                    .any(|split| split.category_id.as_ref() == Some(category_id))
        }
        None => true,
    }
}

fn apply_payload(transaction: &mut ApiTransaction, payload: &TransactionPayload) {
    transaction.date = payload.date.clone();
    transaction.merchant = payload.merchant.clone();
    transaction.description = payload.description.clone();
    transaction.amount = payload.amount;
    transaction.currency = payload.currency.clone();
    transaction.category_id = payload.category_id.clone();
    transaction.notes = payload.notes.clone();
    transaction.receipt_id = payload.receipt_id.clone();
    transaction.splits = payload.splits.clone();
    transaction.updated_at = Some(now_timestamp());
}

#[async_trait]
impl TransactionStorage for MemoryTransactionRepository {
    async fn list_transactions(&self, request: &TransactionListRequest) -> LedgerResult<Vec<ApiTransaction>> {
        let mut state = self.state.lock().await;
        state.check_failure()?;
        let mut transactions: Vec<ApiTransaction> = state
            .transactions
            .iter()
            .filter(|transaction| matches_request(transaction, request))
            .cloned()
            .collect();
        transactions.sort_by(|a, b| b.date.cmp(&a.date));
        if let Some(limit) = request.limit {
            transactions.truncate(limit as usize);
        }
        Ok(transactions)
    }

    async fn create_transaction(&self, payload: &TransactionPayload) -> LedgerResult<ApiTransaction> {
        let mut state = self.state.lock().await;
        state.check_failure()?;
        require_date(&payload.date)?;

        let now = now_timestamp();
        let mut transaction = ApiTransaction {
            txn_id: Uuid::new_v4().to_string(),
            date: String::new(),
            merchant: None,
            description: None,
            amount: 0,
            currency: None,
            category_id: None,
            notes: None,
            source: payload.source.clone().or_else(|| Some("manual".to_string())),
            account_id: None,
            receipt_id: None,
            splits: Vec::new(),
            created_at: Some(now),
            updated_at: None,
        };
        apply_payload(&mut transaction, payload);
        state.transactions.push(transaction.clone());
        Ok(transaction)
    }

    async fn update_transaction(
        &self,
        transaction_id: &str,
        date: &str,
        payload: &TransactionPayload,
    ) -> LedgerResult<ApiTransaction> {
        let mut state = self.state.lock().await;
        state.check_failure()?;
        require_date(&payload.date)?;
        let transaction = state
            .transactions
            .iter_mut()
            .find(|t| t.txn_id == transaction_id && t.date == date)
            .ok_or_else(|| LedgerError::not_found(format!("Transaction {} on {}", transaction_id, date)))?;

        apply_payload(transaction, payload);
        Ok(transaction.clone())
    }

    async fn delete_transaction(&self, transaction_id: &str, date: &str) -> LedgerResult<DeletedResponse> {
        let mut state = self.state.lock().await;
        state.check_failure()?;
        let before = state.transactions.len();
        state
            .transactions
            .retain(|t| !(t.txn_id == transaction_id && t.date == date));
        if state.transactions.len() == before {
            return Err(LedgerError::not_found(format!("Transaction {} on {}", transaction_id, date)));
        }
        Ok(deleted())
    }
}

#[derive(Clone)]
pub struct MemoryRecurringRepository {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryRecurringRepository {
    pub fn new(state: Arc<Mutex<MemoryState>>) -> Self {
        Self { state }
    }

    async fn set_paused(&self, rule_id: &str, paused: bool, end_date: Option<String>) -> LedgerResult<ApiRecurringToggle> {
        let mut state = self.state.lock().await;
        state.check_failure()?;
        let rule = state
            .recurring
            .iter_mut()
            .find(|rule| rule.rule_id == rule_id)
            .ok_or_else(|| LedgerError::not_found(format!("Recurring rule {}", rule_id)))?;
        rule.is_paused = paused;
        if end_date.is_some() {
            rule.end_date = end_date;
        }
        Ok(toggle(rule))
    }
}

#[async_trait]
impl RecurringStorage for MemoryRecurringRepository {
    async fn list_recurring(&self) -> LedgerResult<Vec<ApiRecurring>> {
        let mut state = self.state.lock().await;
        state.check_failure()?;
        Ok(state.recurring.clone())
    }

    async fn create_recurring(&self, payload: &RecurringPayload) -> LedgerResult<ApiRecurring> {
        let mut state = self.state.lock().await;
        state.check_failure()?;
        validate_rule(payload)?;
        let rule_id = format!("rec_{}", &Uuid::new_v4().simple().to_string()[..8]);
        let rule = rule_from_payload(rule_id, payload);
        state.recurring.push(rule.clone());
        Ok(rule)
    }

    async fn update_recurring(&self, rule_id: &str, payload: &RecurringPayload) -> LedgerResult<ApiRecurring> {
        let mut state = self.state.lock().await;
        state.check_failure()?;
        validate_rule(payload)?;
        let rule = state
            .recurring
            .iter_mut()
            .find(|rule| rule.rule_id == rule_id)
            .ok_or_else(|| LedgerError::not_found(format!("Recurring rule {}", rule_id)))?;
        *rule = rule_from_payload(rule_id.to_string(), payload);
        Ok(rule.clone())
    }

    async fn pause_recurring(&self, rule_id: &str) -> LedgerResult<ApiRecurringToggle> {
        self.set_paused(rule_id, true, None).await
    }

    async fn resume_recurring(&self, rule_id: &str) -> LedgerResult<ApiRecurringToggle> {
        self.set_paused(rule_id, false, None).await
    }

    async fn stop_recurring(&self, rule_id: &str) -> LedgerResult<ApiRecurringToggle> {
        let today = chrono::Utc::now().date_naive().format("%Y-%m-%d").to_string();
        self.set_paused(rule_id, true, Some(today)).await
    }

    async fn list_bills(&self, date_from: &str, date_to: &str) -> LedgerResult<Vec<ApiBill>> {
        let mut state = self.state.lock().await;
        state.check_failure()?;
        require_date(date_from)?;
        require_date(date_to)?;
        Ok(state
            .bills
            .iter()
            .filter(|bill| {
                bill.due_date
                    .as_deref()
                    .map_or(false, |due| due >= date_from && due <= date_to)
            })
            .cloned()
            .collect())
    }

    async fn update_bill(&self, bill_id: &str, payload: &BillUpdatePayload) -> LedgerResult<ApiBill> {
        let mut state = self.state.lock().await;
        state.check_failure()?;
        if let Some(status) = &payload.status {
            if !BILL_STATUSES.contains(&status.as_str()) {
                return Err(LedgerError::validation(format!("unknown bill status '{}'", status)));
            }
        }
        let bill = state
            .bills
            .iter_mut()
            .find(|bill| bill.bill_id == bill_id)
            .ok_or_else(|| LedgerError::not_found(format!("Bill {}", bill_id)))?;

        if payload.status.is_some() {
            bill.status = payload.status.clone();
        }
        if payload.amount.is_some() {
            bill.amount = payload.amount;
        }
        Ok(bill.clone())
    }
}
