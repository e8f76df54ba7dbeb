//! Month-Budget Overlay.
//!
//! Budget limits are not a field on the category. They live in a sparse,
//! month-indexed overlay: `month -> [Budget]`, at most one entry per
//! `(month, category)`. The overlay caches months fetched from the remote
//! store and keeps them current after its own writes:
//!
//! - `upsert` applies the entry locally, writes it remotely, then re-fetches
//!   the month and the following month (an `apply_to_future` write or the
//!   store's carry-forward may have changed it).
//! - `delete_scoped` removes entries locally across every cached month in the
//!   scope, deletes remotely, then re-fetches the month and the next one.
//! - A failed remote write restores every touched month exactly.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use shared::BudgetDeleteScope;

use crate::backend::domain::commands::budgets::{
    CopyBudgetsCommand, DeleteBudgetCommand, UpsertBudgetCommand,
};
use crate::backend::domain::error::LedgerResult;
use crate::backend::domain::models::budget::{Budget, BudgetValidationError};
use crate::backend::domain::money::MoneyService;
use crate::backend::domain::month::MonthKey;
use crate::backend::domain::optimistic::{run_optimistic, Undoable};
use crate::backend::io::rest::mappers::budget_mapper::BudgetMapper;
use crate::backend::storage::{BudgetStorage, Connection};

/// Cached overlay months
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverlayState {
    months: BTreeMap<MonthKey, Vec<Budget>>,
    fetched: BTreeSet<MonthKey>,
}

impl OverlayState {
    pub fn budgets_for(&self, month: MonthKey) -> &[Budget] {
        self.months.get(&month).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn entry(&self, month: MonthKey, category_id: &str) -> Option<&Budget> {
        self.budgets_for(month)
            .iter()
            .find(|budget| budget.category_id == category_id)
    }

    pub fn is_cached(&self, month: MonthKey) -> bool {
        self.fetched.contains(&month)
    }

    pub fn months(&self) -> impl Iterator<Item = MonthKey> + '_ {
        self.months.keys().copied()
    }

    /// Replace a month with store data, keeping the last of any duplicates
    pub fn replace_month(&mut self, month: MonthKey, budgets: Vec<Budget>) {
        let mut unique: Vec<Budget> = Vec::with_capacity(budgets.len());
        for budget in budgets {
            match unique.iter().position(|b| b.category_id == budget.category_id) {
                Some(index) => unique[index] = budget,
                None => unique.push(budget),
            }
        }
        self.months.insert(month, unique);
        self.fetched.insert(month);
    }

    /// Insert or replace the entry for `(budget.month, budget.category_id)`
    pub fn put(&mut self, budget: Budget) {
        let entries = self.months.entry(budget.month).or_default();
        match entries.iter().position(|b| b.category_id == budget.category_id) {
            Some(index) => entries[index] = budget,
            None => entries.push(budget),
        }
    }

    pub fn remove(&mut self, month: MonthKey, category_id: &str) -> bool {
        match self.months.get_mut(&month) {
            Some(entries) => {
                let before = entries.len();
                entries.retain(|b| b.category_id != category_id);
                entries.len() != before
            }
            None => false,
        }
    }

    /// Cached months a scoped delete reaches
    fn months_in_scope(&self, scope: BudgetDeleteScope, month: MonthKey) -> Vec<MonthKey> {
        match scope {
            BudgetDeleteScope::ThisMonth => vec![month],
            BudgetDeleteScope::FromMonth => {
                let mut months: Vec<MonthKey> = self.months().filter(|m| *m >= month).collect();
                if !months.contains(&month) {
                    months.push(month);
                }
                months
            }
            BudgetDeleteScope::All => {
                let mut months: Vec<MonthKey> = self.months().collect();
                if !months.contains(&month) {
                    months.push(month);
                }
                months
            }
        }
    }
}

impl Undoable for OverlayState {
    type Key = MonthKey;
    type Saved = (Option<Vec<Budget>>, bool);

    fn save(&self, month: &MonthKey) -> Self::Saved {
        (self.months.get(month).cloned(), self.fetched.contains(month))
    }

    fn restore(&mut self, month: &MonthKey, (entries, fetched): Self::Saved) {
        match entries {
            Some(entries) => {
                self.months.insert(*month, entries);
            }
            None => {
                self.months.remove(month);
            }
        }
        if fetched {
            self.fetched.insert(*month);
        } else {
            self.fetched.remove(month);
        }
    }
}

/// Service for the month-indexed budget overlay
#[derive(Clone)]
pub struct BudgetOverlay<C: Connection> {
    budget_repository: C::BudgetRepository,
    money: MoneyService,
    state: Arc<RwLock<OverlayState>>,
}

impl<C: Connection> BudgetOverlay<C> {
    pub fn new(connection: Arc<C>, money: MoneyService) -> Self {
        Self {
            budget_repository: connection.create_budget_repository(),
            money,
            state: Arc::new(RwLock::new(OverlayState::default())),
        }
    }

    /// Load a month from the store unless it is already cached.
    /// With `force` the cached month is replaced with a fresh read.
    pub async fn fetch_month(&self, month: MonthKey, force: bool) -> LedgerResult<Vec<Budget>> {
        if !force {
            let state = self.state.read().await;
            if state.is_cached(month) {
                debug!("Budget month {} served from cache", month);
                return Ok(state.budgets_for(month).to_vec());
            }
        }

        let dtos = self.budget_repository.list_budgets(&month.to_string()).await?;
        let budgets = BudgetMapper::to_domain_list(dtos, &self.money)?;
        debug!("Fetched {} budget entries for {}", budgets.len(), month);

        let mut state = self.state.write().await;
        state.replace_month(month, budgets);
        Ok(state.budgets_for(month).to_vec())
    }

    /// Create or replace one month/category entry.
    ///
    /// Resolves after the month and the next month have been re-read, so a
    /// caller can rely on both being current.
    pub async fn upsert(&self, command: UpsertBudgetCommand) -> LedgerResult<Budget> {
        command.validate()?;
        let currency = self.money.resolve_currency(command.currency.as_deref());
        let mut budget = command.to_budget(currency);
        budget.limit = self.money.round(budget.limit, &budget.currency);
        let payload = BudgetMapper::to_dto(&budget, &self.money)?;
        let month = command.month;

        info!(
            "Upserting budget {}/{} (apply_to_future={})",
            month, command.category_id, command.apply_to_future
        );

        let local = budget.clone();
        run_optimistic(
            &self.state,
            |_| vec![month],
            move |state| state.put(local),
            self.budget_repository.upsert_budget(&payload, command.apply_to_future),
        )
        .await?;

        self.fetch_month(month, true).await?;
        self.fetch_month(month.next(), true).await?;

        Ok(self.entry(month, &command.category_id).await.unwrap_or(budget))
    }

    /// Delete a category's entries for one month, from a month on, or everywhere.
    /// Returns the number of entries the store reported as removed.
    pub async fn delete_scoped(&self, command: DeleteBudgetCommand) -> LedgerResult<u32> {
        if command.category_id.trim().is_empty() {
            return Err(BudgetValidationError::EmptyCategory.into());
        }
        let DeleteBudgetCommand { category_id, scope, month } = command;
        let month_key = month.to_string();

        info!("Deleting budget {} scope={} from {}", category_id, scope, month);

        let remote = async {
            match scope {
                BudgetDeleteScope::ThisMonth => {
                    self.budget_repository.delete_budget(&month_key, &category_id).await
                }
                _ => {
                    self.budget_repository
                        .delete_budget_scoped(&category_id, scope, &month_key)
                        .await
                }
            }
        };

        let category = category_id.clone();
        let response = run_optimistic(
            &self.state,
            |state| state.months_in_scope(scope, month),
            move |state| {
                for covered in state.months_in_scope(scope, month) {
                    state.remove(covered, &category);
                }
            },
            remote,
        )
        .await?;

        self.fetch_month(month, true).await?;
        self.fetch_month(month.next(), true).await?;

        Ok(response.count.unwrap_or(u32::from(response.deleted)))
    }

    /// Seed `month` with `source_month`'s budgets and cache the result
    pub async fn copy_from(&self, command: CopyBudgetsCommand) -> LedgerResult<Vec<Budget>> {
        if command.month == command.source_month {
            return Err(BudgetValidationError::CopyOntoSelf.into());
        }
        info!("Copying budgets from {} into {}", command.source_month, command.month);

        let dtos = self
            .budget_repository
            .copy_budgets(&command.month.to_string(), &command.source_month.to_string())
            .await?;
        let budgets = BudgetMapper::to_domain_list(dtos, &self.money)?;

        let mut state = self.state.write().await;
        state.replace_month(command.month, budgets);
        Ok(state.budgets_for(command.month).to_vec())
    }

    pub async fn budgets_for(&self, month: MonthKey) -> Vec<Budget> {
        self.state.read().await.budgets_for(month).to_vec()
    }

    pub async fn entry(&self, month: MonthKey, category_id: &str) -> Option<Budget> {
        self.state.read().await.entry(month, category_id).cloned()
    }

    pub async fn is_cached(&self, month: MonthKey) -> bool {
        self.state.read().await.is_cached(month)
    }

    pub async fn snapshot(&self) -> OverlayState {
        self.state.read().await.clone()
    }
}
