use async_trait::async_trait;
use shared::{
    ApiBudget, ApiCategory, ApiObjective, ApiObjectiveMonthPlan, BudgetConflict,
    CreateObjectivePayload, DeletedResponse, ObjectiveStatus, UpdateObjectivePayload,
};
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

use super::{now_timestamp, require_month, MemoryState};
use crate::backend::domain::error::{LedgerError, LedgerResult};
use crate::backend::storage::traits::ObjectiveStorage;

const AUTO_CATEGORY_ICON: &str = "repeat";
const AUTO_CATEGORY_COLOR: &str = "#06b6d4";

fn validate_plans(plans: &mut [ApiObjectiveMonthPlan]) -> LedgerResult<()> {
    if plans.is_empty() {
        return Err(LedgerError::validation("plans must not be empty"));
    }
    let mut seen = BTreeSet::new();
    for plan in plans.iter() {
        require_month(&plan.month)?;
        if plan.amount < 0 {
            return Err(LedgerError::validation(format!("amount for {} must be non-negative", plan.month)));
        }
        if !seen.insert(plan.month.clone()) {
            return Err(LedgerError::validation(format!("month {} is planned twice", plan.month)));
        }
    }
    plans.sort_by(|a, b| a.month.cmp(&b.month));
    Ok(())
}

fn validate_name(name: &str) -> LedgerResult<()> {
    if name.trim().is_empty() {
        return Err(LedgerError::validation("name is required"));
    }
    Ok(())
}

impl MemoryState {
    fn find_objective(&self, objective_id: &str) -> LedgerResult<usize> {
        self.objectives
            .iter()
            .position(|objective| objective.objective_id == objective_id)
            .ok_or_else(|| LedgerError::not_found(format!("Objective {}", objective_id)))
    }

    fn require_category(&self, category_id: &str) -> LedgerResult<()> {
        if self.categories.iter().any(|c| c.category_id == category_id) {
            Ok(())
        } else {
            Err(LedgerError::not_found(format!("Category {}", category_id)))
        }
    }

    fn category_by_name(&self, name: &str) -> Option<String> {
        let wanted = name.trim().to_lowercase();
        self.categories
            .iter()
            .find(|c| c.name.trim().to_lowercase() == wanted)
            .map(|c| c.category_id.clone())
    }

    /// Explicit entries in the plan months that this objective does not own
    fn objective_conflicts(
        &self,
        category_id: &str,
        plans: &[ApiObjectiveMonthPlan],
        objective_id: Option<&str>,
    ) -> Vec<BudgetConflict> {
        plans
            .iter()
            .filter_map(|plan| {
                let existing = self
                    .budgets
                    .get(&(category_id.to_string(), plan.month.clone()))?;
                if existing.objective_id.is_some() && existing.objective_id.as_deref() == objective_id {
                    return None;
                }
                Some(BudgetConflict {
                    month: plan.month.clone(),
                    category_id: category_id.to_string(),
                    objective_id: existing.objective_id.clone(),
                })
            })
            .collect()
    }

    fn remove_objective_rows(&mut self, objective_id: &str) -> u32 {
        let before = self.budgets.len();
        self.budgets
            .retain(|_, budget| budget.objective_id.as_deref() != Some(objective_id));
        (before - self.budgets.len()) as u32
    }

    fn write_objective_rows(&mut self, objective: &ApiObjective) {
        for plan in &objective.plans {
            let key = (objective.category_id.clone(), plan.month.clone());
            self.stops.remove(&key);
            self.budgets.insert(
                key,
                ApiBudget {
                    month: plan.month.clone(),
                    category_id: objective.category_id.clone(),
                    limit: plan.amount,
                    rollover: false,
                    rollover_target_category_id: None,
                    currency: objective.currency.clone(),
                    copied_from_month: None,
                    purpose: Some(objective.name.clone()),
                    carry_forward_enabled: false,
                    is_terminal: false,
                    objective_id: Some(objective.objective_id.clone()),
                },
            );
        }
    }
}

#[derive(Clone)]
pub struct MemoryObjectiveRepository {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryObjectiveRepository {
    pub fn new(state: Arc<Mutex<MemoryState>>) -> Self {
        Self { state }
    }
}

#[async_trait]
impl ObjectiveStorage for MemoryObjectiveRepository {
    async fn list_objectives(&self) -> LedgerResult<Vec<ApiObjective>> {
        let mut state = self.state.lock().await;
        state.check_failure()?;
        Ok(state.objectives.clone())
    }

    async fn create_objective(&self, payload: &CreateObjectivePayload, force: bool) -> LedgerResult<ApiObjective> {
        let mut state = self.state.lock().await;
        state.check_failure()?;

        validate_name(&payload.name)?;
        if matches!(payload.total_amount, Some(total) if total < 0) {
            return Err(LedgerError::validation("totalAmount must be non-negative"));
        }
        let mut plans = payload.plans.clone();
        validate_plans(&mut plans)?;

        let existing_category = match &payload.category_id {
            Some(category_id) => {
                state.require_category(category_id)?;
                Some(category_id.clone())
            }
            None => state.category_by_name(&payload.name),
        };

        if let Some(category_id) = &existing_category {
            let conflicts = state.objective_conflicts(category_id, &plans, None);
            if !conflicts.is_empty() && !force {
                return Err(LedgerError::Conflict {
                    message: "Budget conflicts".to_string(),
                    conflicts,
                });
            }
        }

        let category_id = match existing_category {
            Some(category_id) => category_id,
            None => {
                let category = ApiCategory {
                    category_id: Uuid::new_v4().to_string(),
                    name: payload.name.trim().to_string(),
                    group: None,
                    icon: Some(AUTO_CATEGORY_ICON.to_string()),
                    color: Some(AUTO_CATEGORY_COLOR.to_string()),
                    rollover: false,
                    rollover_target_category_id: None,
                    monthly_budget: None,
                };
                info!("Auto-created category {} for objective '{}'", category.category_id, category.name);
                let id = category.category_id.clone();
                state.categories.push(category);
                id
            }
        };

        let now = now_timestamp();
        let objective = ApiObjective {
            objective_id: Uuid::new_v4().to_string(),
            name: payload.name.trim().to_string(),
            category_id,
            currency: payload.currency.clone(),
            total_amount: payload.total_amount,
            status: ObjectiveStatus::Active,
            plans,
            created_at: Some(now.clone()),
            updated_at: Some(now),
        };
        state.write_objective_rows(&objective);
        state.objectives.push(objective.clone());
        state.objective_writes += 1;
        Ok(objective)
    }

    async fn update_objective(
        &self,
        objective_id: &str,
        payload: &UpdateObjectivePayload,
        force: bool,
    ) -> LedgerResult<ApiObjective> {
        let mut state = self.state.lock().await;
        state.check_failure()?;

        let index = state.find_objective(objective_id)?;
        let mut objective = state.objectives[index].clone();
        if objective.status == ObjectiveStatus::Archived {
            return Err(LedgerError::validation("Archived objectives cannot be changed"));
        }

        if let Some(name) = &payload.name {
            validate_name(name)?;
            objective.name = name.trim().to_string();
        }
        if let Some(category_id) = &payload.category_id {
            state.require_category(category_id)?;
            objective.category_id = category_id.clone();
        }
        if let Some(currency) = &payload.currency {
            objective.currency = Some(currency.clone());
        }
        if let Some(total) = payload.total_amount {
            if total < 0 {
                return Err(LedgerError::validation("totalAmount must be non-negative"));
            }
            objective.total_amount = Some(total);
        }
        if let Some(status) = payload.status {
            objective.status = status;
        }
        if let Some(plans) = &payload.plans {
            let mut plans = plans.clone();
            validate_plans(&mut plans)?;
            objective.plans = plans;
        }

        let conflicts = state.objective_conflicts(&objective.category_id, &objective.plans, Some(objective_id));
        if !conflicts.is_empty() && !force {
            return Err(LedgerError::Conflict {
                message: "Budget conflicts".to_string(),
                conflicts,
            });
        }

        objective.updated_at = Some(now_timestamp());
        state.remove_objective_rows(objective_id);
        state.write_objective_rows(&objective);
        state.objectives[index] = objective.clone();
        state.objective_writes += 1;
        Ok(objective)
    }

    async fn complete_objective(&self, objective_id: &str) -> LedgerResult<ApiObjective> {
        let mut state = self.state.lock().await;
        state.check_failure()?;

        let index = state.find_objective(objective_id)?;
        let objective = &mut state.objectives[index];
        if objective.status != ObjectiveStatus::Active {
            return Err(LedgerError::validation(format!("Objective is {}", objective.status)));
        }
        objective.status = ObjectiveStatus::Completed;
        objective.updated_at = Some(now_timestamp());
        let completed = objective.clone();
        state.objective_writes += 1;
        Ok(completed)
    }

    async fn delete_objective(&self, objective_id: &str) -> LedgerResult<DeletedResponse> {
        let mut state = self.state.lock().await;
        state.check_failure()?;

        let index = state.find_objective(objective_id)?;
        state.objectives[index].status = ObjectiveStatus::Archived;
        state.objectives[index].updated_at = Some(now_timestamp());
        let removed = state.remove_objective_rows(objective_id);
        state.objective_writes += 1;

        info!("Archived objective {} and removed {} budget rows", objective_id, removed);
        Ok(DeletedResponse {
            deleted: true,
            count: Some(removed),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::storage::memory::MemoryConnection;
    use crate::backend::storage::traits::{BudgetStorage, Connection};
    use shared::PlanKind;

    fn plan(month: &str, amount: i64) -> ApiObjectiveMonthPlan {
        ApiObjectiveMonthPlan {
            month: month.to_string(),
            amount,
            kind: PlanKind::Save,
            is_last_month: false,
        }
    }

    fn payload(name: &str, category_id: Option<&str>, plans: Vec<ApiObjectiveMonthPlan>) -> CreateObjectivePayload {
        CreateObjectivePayload {
            name: name.to_string(),
            category_id: category_id.map(str::to_string),
            currency: Some("CLP".to_string()),
            total_amount: None,
            plans,
        }
    }

    #[tokio::test]
    async fn test_rejected_writes_are_not_counted() {
        let connection = MemoryConnection::new();
        let repo = connection.create_objective_repository();

        let mut negative = payload("Trip", None, vec![plan("2026-01", 1000)]);
        negative.total_amount = Some(-1);
        assert!(matches!(repo.create_objective(&negative, false).await, Err(LedgerError::Validation(_))));
        let blank = payload("  ", None, vec![plan("2026-01", 1000)]);
        assert!(repo.create_objective(&blank, false).await.is_err());
        assert!(repo.complete_objective("obj-missing").await.is_err());
        assert_eq!(connection.objective_writes().await, 0);

        let created = repo.create_objective(&payload("Trip", None, vec![plan("2026-01", 1000)]), false).await.unwrap();
        repo.complete_objective(&created.objective_id).await.unwrap();
        assert_eq!(connection.objective_writes().await, 2);
    }

    #[tokio::test]
    async fn test_auto_category_is_reused_case_insensitively() {
        let connection = MemoryConnection::new();
        let repo = connection.create_objective_repository();

        let first = repo
            .create_objective(&payload("Trip", None, vec![plan("2026-01", 10)]), false)
            .await
            .unwrap();
        repo.delete_objective(&first.objective_id).await.unwrap();
        let second = repo
            .create_objective(&payload("  trip ", None, vec![plan("2026-02", 10)]), false)
            .await
            .unwrap();

        assert_eq!(first.category_id, second.category_id);
        assert_eq!(connection.state.lock().await.categories.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_explicit_category_is_not_found() {
        let connection = MemoryConnection::new();
        let repo = connection.create_objective_repository();

        let result = repo
            .create_objective(&payload("Trip", Some("missing"), vec![plan("2026-01", 10)]), false)
            .await;
        assert!(matches!(result, Err(LedgerError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_moves_owned_rows_without_conflicting_with_itself() {
        let connection = MemoryConnection::new();
        let repo = connection.create_objective_repository();
        let budgets = connection.create_budget_repository();
        let objective = repo
            .create_objective(&payload("Trip", None, vec![plan("2026-01", 10), plan("2026-02", 10)]), false)
            .await
            .unwrap();

        let update = UpdateObjectivePayload {
            plans: Some(vec![plan("2026-02", 15), plan("2026-03", 5)]),
            ..Default::default()
        };
        let updated = repo.update_objective(&objective.objective_id, &update, false).await.unwrap();

        assert_eq!(updated.plans.len(), 2);
        assert!(budgets.list_budgets("2026-01").await.unwrap().is_empty());
        assert_eq!(budgets.list_budgets("2026-02").await.unwrap()[0].limit, 15);
        assert_eq!(budgets.list_budgets("2026-03").await.unwrap()[0].limit, 5);
    }
}
