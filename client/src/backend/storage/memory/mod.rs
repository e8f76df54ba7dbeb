//! In-process store speaking the same contract as the REST server.
//!
//! It backs the unit tests, the `--offline` demo and the stub HTTP server.
//! Besides plain CRUD it reproduces the server-side budget rules the client
//! depends on: carry-forward of the latest earlier entry, `applyFuture`
//! overwrites, stop markers left by deletes, and objective-owned rows.

pub mod budgets;
pub mod demo;
pub mod ledger;
pub mod objectives;

use shared::{ApiBill, ApiBudget, ApiCategory, ApiObjective, ApiRecurring, ApiTransaction};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

use crate::backend::domain::error::{LedgerError, LedgerResult};
use crate::backend::storage::traits::Connection;

pub use budgets::MemoryBudgetRepository;
pub use ledger::{MemoryCategoryRepository, MemoryRecurringRepository, MemoryTransactionRepository};
pub use objectives::MemoryObjectiveRepository;

/// `(category_id, month)`
pub(crate) type BudgetKey = (String, String);

#[derive(Debug, Default)]
pub struct MemoryState {
    /// Explicit budget entries
    pub(crate) budgets: BTreeMap<BudgetKey, ApiBudget>,
    /// Months where carry-forward of earlier entries stops
    pub(crate) stops: BTreeSet<BudgetKey>,
    pub(crate) objectives: Vec<ApiObjective>,
    pub(crate) categories: Vec<ApiCategory>,
    pub(crate) transactions: Vec<ApiTransaction>,
    pub(crate) recurring: Vec<ApiRecurring>,
    pub(crate) bills: Vec<ApiBill>,
    failure: Option<LedgerError>,
    budget_reads: usize,
    budget_writes: usize,
    objective_writes: usize,
}

impl MemoryState {
    /// Fail the current call if a failure was injected
    pub(crate) fn check_failure(&mut self) -> LedgerResult<()> {
        match self.failure.take() {
            Some(error) => {
                debug!("Injected store failure: {}", error);
                Err(error)
            }
            None => Ok(()),
        }
    }
}

/// MemoryConnection shares one store state between all its repositories
#[derive(Clone, Default)]
pub struct MemoryConnection {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryConnection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next store call, read or write, fail with `error`
    pub async fn fail_next(&self, error: LedgerError) {
        self.state.lock().await.failure = Some(error);
    }

    pub async fn budget_reads(&self) -> usize {
        self.state.lock().await.budget_reads
    }

    pub async fn budget_writes(&self) -> usize {
        self.state.lock().await.budget_writes
    }

    pub async fn objective_writes(&self) -> usize {
        self.state.lock().await.objective_writes
    }

    /// Store an explicit budget entry as-is
    pub async fn insert_budget(&self, budget: ApiBudget) {
        let mut state = self.state.lock().await;
        let key = (budget.category_id.clone(), budget.month.clone());
        state.stops.remove(&key);
        state.budgets.insert(key, budget);
    }

    pub async fn insert_category(&self, category: ApiCategory) {
        let mut state = self.state.lock().await;
        state.categories.retain(|c| c.category_id != category.category_id);
        state.categories.push(category);
    }

    pub async fn insert_transaction(&self, transaction: ApiTransaction) {
        self.state.lock().await.transactions.push(transaction);
    }

    pub async fn insert_recurring(&self, rule: ApiRecurring) {
        self.state.lock().await.recurring.push(rule);
    }

    pub async fn insert_bill(&self, bill: ApiBill) {
        self.state.lock().await.bills.push(bill);
    }
}

impl Connection for MemoryConnection {
    type BudgetRepository = MemoryBudgetRepository;
    type ObjectiveRepository = MemoryObjectiveRepository;
    type CategoryRepository = MemoryCategoryRepository;
    type TransactionRepository = MemoryTransactionRepository;
    type RecurringRepository = MemoryRecurringRepository;

    fn create_budget_repository(&self) -> Self::BudgetRepository {
        MemoryBudgetRepository::new(self.state.clone())
    }

    fn create_objective_repository(&self) -> Self::ObjectiveRepository {
        MemoryObjectiveRepository::new(self.state.clone())
    }

    fn create_category_repository(&self) -> Self::CategoryRepository {
        MemoryCategoryRepository::new(self.state.clone())
    }

    fn create_transaction_repository(&self) -> Self::TransactionRepository {
        MemoryTransactionRepository::new(self.state.clone())
    }

    fn create_recurring_repository(&self) -> Self::RecurringRepository {
        MemoryRecurringRepository::new(self.state.clone())
    }
}

/// Reject malformed `YYYY-MM` months the way the server does
pub(crate) fn require_month(month: &str) -> LedgerResult<()> {
    crate::backend::domain::month::MonthKey::parse(month).map(|_| ())
}

pub(crate) fn now_timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}
