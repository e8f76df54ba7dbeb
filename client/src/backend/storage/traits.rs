//! # Storage Traits
//!
//! This module defines the remote-store abstraction that the ledger services
//! talk to. Implementations speak the wire types from the `shared` crate
//! (minor-unit integers, `YYYY-MM` months); the domain services convert at
//! this boundary through the REST mappers.

use async_trait::async_trait;
use shared::{
    ApiBill, ApiBudget, ApiCategory, ApiObjective, ApiRecurring, ApiRecurringToggle,
    ApiTransaction, BillUpdatePayload, BudgetDeleteScope, CategoryPayload,
    CreateObjectivePayload, DeletedResponse, RecurringPayload, TransactionListRequest,
    TransactionPayload, UpdateObjectivePayload,
};

use crate::backend::domain::error::LedgerResult;

/// Month-scoped budget entries
#[async_trait]
pub trait BudgetStorage: Send + Sync {
    /// Entries visible in a month, including ones the store carried forward
    async fn list_budgets(&self, month: &str) -> LedgerResult<Vec<ApiBudget>>;

    /// Create or replace the entry for `(budget.month, budget.category_id)`.
    /// With `apply_future` the store also overwrites later explicit entries.
    async fn upsert_budget(&self, budget: &ApiBudget, apply_future: bool) -> LedgerResult<ApiBudget>;

    /// Delete the single entry of one month
    async fn delete_budget(&self, month: &str, category_id: &str) -> LedgerResult<DeletedResponse>;

    async fn delete_budget_scoped(
        &self,
        category_id: &str,
        scope: BudgetDeleteScope,
        month: &str,
    ) -> LedgerResult<DeletedResponse>;

    /// Copy `source_month`'s entries into `month`; returns `month`'s entries
    async fn copy_budgets(&self, month: &str, source_month: &str) -> LedgerResult<Vec<ApiBudget>>;
}

/// Savings objectives and the budget rows they own
#[async_trait]
pub trait ObjectiveStorage: Send + Sync {
    async fn list_objectives(&self) -> LedgerResult<Vec<ApiObjective>>;

    /// Fails with a conflict when a plan month is already budgeted, unless `force`
    async fn create_objective(
        &self,
        payload: &CreateObjectivePayload,
        force: bool,
    ) -> LedgerResult<ApiObjective>;

    async fn update_objective(
        &self,
        objective_id: &str,
        payload: &UpdateObjectivePayload,
        force: bool,
    ) -> LedgerResult<ApiObjective>;

    async fn complete_objective(&self, objective_id: &str) -> LedgerResult<ApiObjective>;

    /// Archives the objective and drops its budget rows
    async fn delete_objective(&self, objective_id: &str) -> LedgerResult<DeletedResponse>;
}

#[async_trait]
pub trait CategoryStorage: Send + Sync {
    async fn list_categories(&self) -> LedgerResult<Vec<ApiCategory>>;
    async fn create_category(&self, payload: &CategoryPayload) -> LedgerResult<ApiCategory>;
    async fn update_category(&self, category_id: &str, payload: &CategoryPayload) -> LedgerResult<ApiCategory>;
    async fn delete_category(&self, category_id: &str) -> LedgerResult<DeletedResponse>;
}

#[async_trait]
pub trait TransactionStorage: Send + Sync {
    async fn list_transactions(&self, request: &TransactionListRequest) -> LedgerResult<Vec<ApiTransaction>>;
    async fn create_transaction(&self, payload: &TransactionPayload) -> LedgerResult<ApiTransaction>;

    /// `date` is the transaction's current date, which the store keys on
    async fn update_transaction(
        &self,
        transaction_id: &str,
        date: &str,
        payload: &TransactionPayload,
    ) -> LedgerResult<ApiTransaction>;

    async fn delete_transaction(&self, transaction_id: &str, date: &str) -> LedgerResult<DeletedResponse>;
}

#[async_trait]
pub trait RecurringStorage: Send + Sync {
    async fn list_recurring(&self) -> LedgerResult<Vec<ApiRecurring>>;
    async fn create_recurring(&self, payload: &RecurringPayload) -> LedgerResult<ApiRecurring>;
    async fn update_recurring(&self, rule_id: &str, payload: &RecurringPayload) -> LedgerResult<ApiRecurring>;
    async fn pause_recurring(&self, rule_id: &str) -> LedgerResult<ApiRecurringToggle>;
    async fn resume_recurring(&self, rule_id: &str) -> LedgerResult<ApiRecurringToggle>;

    /// Ends the rule today and pauses it
    async fn stop_recurring(&self, rule_id: &str) -> LedgerResult<ApiRecurringToggle>;

    /// Bills due between the two `YYYY-MM-DD` dates, both inclusive
    async fn list_bills(&self, date_from: &str, date_to: &str) -> LedgerResult<Vec<ApiBill>>;

    async fn update_bill(&self, bill_id: &str, payload: &BillUpdatePayload) -> LedgerResult<ApiBill>;
}

/// Trait defining the interface for store connections
///
/// A connection hands out one repository per entity family. Repositories are
/// cheap to clone and share the connection's underlying client or state.
pub trait Connection: Send + Sync + Clone + 'static {
    type BudgetRepository: BudgetStorage + Clone;
    type ObjectiveRepository: ObjectiveStorage + Clone;
    type CategoryRepository: CategoryStorage + Clone;
    type TransactionRepository: TransactionStorage + Clone;
    type RecurringRepository: RecurringStorage + Clone;

    fn create_budget_repository(&self) -> Self::BudgetRepository;
    fn create_objective_repository(&self) -> Self::ObjectiveRepository;
    fn create_category_repository(&self) -> Self::CategoryRepository;
    fn create_transaction_repository(&self) -> Self::TransactionRepository;
    fn create_recurring_repository(&self) -> Self::RecurringRepository;
}
