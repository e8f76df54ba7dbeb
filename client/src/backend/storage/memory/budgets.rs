use async_trait::async_trait;
use shared::{ApiBudget, BudgetDeleteScope, DeletedResponse};
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::{require_month, MemoryState};
use crate::backend::domain::error::{LedgerError, LedgerResult};
use crate::backend::storage::traits::BudgetStorage;

impl MemoryState {
    /// Entry visible in `month`: the explicit one, or the latest earlier entry
    /// carried forward unless it is terminal, opted out, or a stop marker lies
    /// between it and `month`.
    pub(crate) fn visible_budget(&self, category_id: &str, month: &str) -> Option<ApiBudget> {
        let key = (category_id.to_string(), month.to_string());
        if let Some(explicit) = self.budgets.get(&key) {
            return Some(explicit.clone());
        }

        let lower = (category_id.to_string(), String::new());
        let ((_, source_month), source) = self.budgets.range(lower..key).next_back()?;
        if !source.carry_forward_enabled || source.is_terminal {
            return None;
        }
        let blocked = self.stops.iter().any(|(stop_category, stop_month)| {
            stop_category == category_id
                && stop_month.as_str() > source_month.as_str()
                && stop_month.as_str() <= month
        });
        if blocked {
            return None;
        }

        let mut carried = source.clone();
        carried.month = month.to_string();
        carried.copied_from_month = Some(source_month.clone());
        Some(carried)
    }

    pub(crate) fn month_budgets(&self, month: &str) -> Vec<ApiBudget> {
        let categories: BTreeSet<&str> = self
            .budgets
            .keys()
            .map(|(category_id, _)| category_id.as_str())
            .collect();
        categories
            .into_iter()
            .filter_map(|category_id| self.visible_budget(category_id, month))
            .collect()
    }

    /// Remove explicit entries of `category_id` matching `in_scope`, returning how many
    fn remove_budgets<F>(&mut self, category_id: &str, in_scope: F) -> u32
    where
        F: Fn(&str) -> bool,
    {
        let before = self.budgets.len();
        self.budgets
            .retain(|(category, month), _| !(category == category_id && in_scope(month)));
        (before - self.budgets.len()) as u32
    }
}

#[derive(Clone)]
pub struct MemoryBudgetRepository {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryBudgetRepository {
    pub fn new(state: Arc<Mutex<MemoryState>>) -> Self {
        Self { state }
    }
}

#[async_trait]
impl BudgetStorage for MemoryBudgetRepository {
    async fn list_budgets(&self, month: &str) -> LedgerResult<Vec<ApiBudget>> {
        let mut state = self.state.lock().await;
        state.check_failure()?;
        require_month(month)?;
        state.budget_reads += 1;
        Ok(state.month_budgets(month))
    }

    async fn upsert_budget(&self, budget: &ApiBudget, apply_future: bool) -> LedgerResult<ApiBudget> {
        let mut state = self.state.lock().await;
        state.check_failure()?;
        require_month(&budget.month)?;
        if budget.limit < 0 {
            return Err(LedgerError::validation("limit must be non-negative"));
        }
        state.budget_writes += 1;

        let mut stored = budget.clone();
        stored.copied_from_month = None;
        let key = (stored.category_id.clone(), stored.month.clone());
        state.stops.remove(&key);
        state.budgets.insert(key, stored.clone());

        if apply_future {
            let mut overwritten = 0;
            for ((category_id, month), later) in state.budgets.iter_mut() {
                if *category_id == stored.category_id && *month > stored.month {
                    later.limit = stored.limit;
                    later.rollover = stored.rollover;
                    later.rollover_target_category_id = stored.rollover_target_category_id.clone();
                    overwritten += 1;
                }
            }
            debug!("applyFuture overwrote {} later entries", overwritten);
        }

        Ok(stored)
    }

    async fn delete_budget(&self, month: &str, category_id: &str) -> LedgerResult<DeletedResponse> {
        let mut state = self.state.lock().await;
        state.check_failure()?;
        require_month(month)?;
        if state.visible_budget(category_id, month).is_none() {
            return Err(LedgerError::not_found(format!("Budget {}/{}", month, category_id)));
        }
        state.budget_writes += 1;

        state.remove_budgets(category_id, |m| m == month);
        state.stops.insert((category_id.to_string(), month.to_string()));
        Ok(DeletedResponse {
            deleted: true,
            count: None,
        })
    }

    async fn delete_budget_scoped(
        &self,
        category_id: &str,
        scope: BudgetDeleteScope,
        month: &str,
    ) -> LedgerResult<DeletedResponse> {
        let mut state = self.state.lock().await;
        state.check_failure()?;
        require_month(month)?;
        state.budget_writes += 1;

        let count = match scope {
            BudgetDeleteScope::ThisMonth => {
                let count = state.remove_budgets(category_id, |m| m == month);
                state.stops.insert((category_id.to_string(), month.to_string()));
                count
            }
            BudgetDeleteScope::FromMonth => {
                let count = state.remove_budgets(category_id, |m| m >= month);
                state.stops.insert((category_id.to_string(), month.to_string()));
                count
            }
            BudgetDeleteScope::All => {
                state.stops.retain(|(category, _)| category != category_id);
                state.remove_budgets(category_id, |_| true)
            }
        };

        info!("Scoped delete {} {} from {} removed {}", category_id, scope, month, count);
        Ok(DeletedResponse {
            deleted: true,
            count: Some(count),
        })
    }

    async fn copy_budgets(&self, month: &str, source_month: &str) -> LedgerResult<Vec<ApiBudget>> {
        let mut state = self.state.lock().await;
        state.check_failure()?;
        require_month(month)?;
        require_month(source_month)?;
        if month == source_month {
            return Err(LedgerError::validation("Cannot copy a month onto itself"));
        }
        state.budget_writes += 1;

        let sources: Vec<ApiBudget> = state
            .month_budgets(source_month)
            .into_iter()
            .filter(|budget| budget.objective_id.is_none())
            .collect();
        for source in sources {
            let key = (source.category_id.clone(), month.to_string());
            if state.budgets.contains_key(&key) {
                continue;
            }
            let mut copy = source;
            copy.month = month.to_string();
            copy.copied_from_month = Some(source_month.to_string());
            state.stops.remove(&key);
            state.budgets.insert(key, copy);
        }

        Ok(state.month_budgets(month))
    }
}
