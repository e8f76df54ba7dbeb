//! Objective Planner.
//!
//! An objective decomposes a target amount into a schedule of monthly
//! SPEND/SAVE allocations. The remote store projects every plan month into
//! the budget overlay as an entry tagged with the objective's id, so after
//! any create, update or delete this service re-reads every month the
//! objective touched (old and new months on updates).
//!
//! ## Status machine
//!
//! `ACTIVE -> COMPLETED` through [`ObjectivePlanner::complete_objective`],
//! and `ACTIVE | COMPLETED -> ARCHIVED` through
//! [`ObjectivePlanner::delete_objective`]. Nothing leaves ARCHIVED.

use rust_decimal::Decimal;
use shared::{ObjectiveStatus, PlanKind};
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::backend::domain::budget_overlay::BudgetOverlay;
use crate::backend::domain::category_service::CategoryService;
use crate::backend::domain::commands::objectives::{CreateObjectiveCommand, UpdateObjectiveCommand};
use crate::backend::domain::error::{LedgerError, LedgerResult};
use crate::backend::domain::models::objective::{
    Objective, ObjectiveCategory, ObjectiveMonthPlan, ObjectiveValidationError,
};
use crate::backend::domain::money::MoneyService;
use crate::backend::domain::month::MonthKey;
use crate::backend::domain::optimistic::EntityList;
use crate::backend::io::rest::mappers::objective_mapper::ObjectiveMapper;
use crate::backend::storage::{Connection, ObjectiveStorage};

/// Split `total` into `count` integer parts that sum exactly to `total`.
///
/// Every part is `floor(total / count)`; the first `total mod count` parts get
/// one extra unit. `count == 0` yields no parts.
pub fn distribute(total: i64, count: usize) -> Vec<i64> {
    if count == 0 {
        return Vec::new();
    }
    let parts = count as i64;
    let base = total.div_euclid(parts);
    let remainder = total.rem_euclid(parts) as usize;
    (0..count)
        .map(|index| if index < remainder { base + 1 } else { base })
        .collect()
}

/// [`distribute`] a decimal amount in the currency's minor unit
pub fn distribute_amount(
    money: &MoneyService,
    total: Decimal,
    count: usize,
    currency: &str,
) -> LedgerResult<Vec<Decimal>> {
    let minor = money.to_minor(total, currency)?;
    Ok(distribute(minor, count)
        .into_iter()
        .map(|part| money.from_minor(part, currency))
        .collect())
}

/// Even schedule of `total` over `start..=end`, last month flagged
pub fn plan_schedule(
    money: &MoneyService,
    total: Decimal,
    start: MonthKey,
    end: MonthKey,
    kind: PlanKind,
    currency: &str,
) -> LedgerResult<Vec<ObjectiveMonthPlan>> {
    if total.is_sign_negative() && !total.is_zero() {
        return Err(ObjectiveValidationError::NegativeTotal.into());
    }
    let months = MonthKey::range_inclusive(start, end);
    if months.is_empty() {
        return Err(LedgerError::validation(format!(
            "End month {} is before start month {}",
            end, start
        )));
    }
    let amounts = distribute_amount(money, total, months.len(), currency)?;
    let last = months.len() - 1;
    Ok(months
        .into_iter()
        .zip(amounts)
        .enumerate()
        .map(|(index, (month, amount))| ObjectiveMonthPlan {
            month,
            amount,
            kind,
            is_last_month: index == last,
        })
        .collect())
}

/// Sort plans by month and reject empty, duplicated or negative schedules
pub fn normalize_plans(
    mut plans: Vec<ObjectiveMonthPlan>,
) -> Result<Vec<ObjectiveMonthPlan>, ObjectiveValidationError> {
    if plans.is_empty() {
        return Err(ObjectiveValidationError::EmptyPlans);
    }
    plans.sort_by_key(|plan| plan.month);
    if let Some(pair) = plans.windows(2).find(|pair| pair[0].month == pair[1].month) {
        return Err(ObjectiveValidationError::DuplicateMonth(pair[0].month));
    }
    if let Some(plan) = plans
        .iter()
        .find(|plan| plan.amount.is_sign_negative() && !plan.amount.is_zero())
    {
        return Err(ObjectiveValidationError::NegativePlanAmount(plan.month));
    }
    Ok(plans)
}

fn validate_name(name: &str) -> Result<(), ObjectiveValidationError> {
    if name.trim().is_empty() {
        return Err(ObjectiveValidationError::EmptyName);
    }
    Ok(())
}

fn validate_total(total: Option<Decimal>) -> Result<(), ObjectiveValidationError> {
    match total {
        Some(total) if total.is_sign_negative() && !total.is_zero() => {
            Err(ObjectiveValidationError::NegativeTotal)
        }
        _ => Ok(()),
    }
}

/// How one plan month reconciles against the overlay
#[derive(Debug, Clone, PartialEq)]
pub struct PlanReconciliation {
    pub month: MonthKey,
    pub kind: PlanKind,
    pub planned: Decimal,
    /// Limit of the overlay entry for the objective's category, if any
    pub budgeted: Option<Decimal>,
    /// The entry is tagged with this objective
    pub owned: bool,
    pub matches: bool,
}

/// Computed funding view of an objective
#[derive(Debug, Clone, PartialEq)]
pub struct FundingState {
    pub objective_id: String,
    pub status: ObjectiveStatus,
    pub planned_total: Decimal,
    pub target_total: Option<Decimal>,
    /// Target minus planned; negative when over-planned
    pub unplanned: Option<Decimal>,
    pub months: Vec<PlanReconciliation>,
}

impl FundingState {
    pub fn is_reconciled(&self) -> bool {
        self.months.iter().all(|month| month.matches)
    }
}

/// Service for managing objectives and their overlay projection
#[derive(Clone)]
pub struct ObjectivePlanner<C: Connection> {
    objective_repository: C::ObjectiveRepository,
    overlay: BudgetOverlay<C>,
    categories: CategoryService<C>,
    money: MoneyService,
    state: Arc<RwLock<EntityList<Objective>>>,
}

impl<C: Connection> ObjectivePlanner<C> {
    pub fn new(
        connection: Arc<C>,
        money: MoneyService,
        overlay: BudgetOverlay<C>,
        categories: CategoryService<C>,
    ) -> Self {
        Self {
            objective_repository: connection.create_objective_repository(),
            overlay,
            categories,
            money,
            state: Arc::new(RwLock::new(EntityList::default())),
        }
    }

    /// All objectives known to the store, archived ones included
    pub async fn list_objectives(&self, refresh: bool) -> LedgerResult<Vec<Objective>> {
        if !refresh {
            let state = self.state.read().await;
            if state.is_loaded() {
                return Ok(state.items().to_vec());
            }
        }

        let dtos = self.objective_repository.list_objectives().await?;
        let objectives = ObjectiveMapper::to_domain_list(dtos, &self.money)?;
        debug!("Loaded {} objectives", objectives.len());

        let mut state = self.state.write().await;
        state.replace_all(objectives);
        Ok(state.items().to_vec())
    }

    /// Objectives that are not archived, newest first
    pub async fn active_objectives(&self) -> LedgerResult<Vec<Objective>> {
        let mut objectives: Vec<Objective> = self
            .list_objectives(false)
            .await?
            .into_iter()
            .filter(|objective| objective.status != ObjectiveStatus::Archived)
            .collect();
        objectives.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(objectives)
    }

    pub async fn get_objective(&self, objective_id: &str) -> LedgerResult<Objective> {
        if !self.state.read().await.is_loaded() {
            self.list_objectives(false).await?;
        }
        self.state
            .read()
            .await
            .get(objective_id)
            .cloned()
            .ok_or_else(|| LedgerError::not_found(format!("Objective {}", objective_id)))
    }

    /// Create an objective and project its plans into the overlay.
    ///
    /// A conflict with existing budget entries is returned unchanged; the
    /// caller may retry with `force`.
    pub async fn create_objective(&self, command: CreateObjectiveCommand) -> LedgerResult<Objective> {
        validate_name(&command.name)?;
        validate_total(command.total_amount)?;
        if matches!(&command.category, ObjectiveCategory::Explicit(id) if id.trim().is_empty()) {
            return Err(ObjectiveValidationError::EmptyCategory.into());
        }
        let plans = normalize_plans(command.plans.clone())?;
        let payload = ObjectiveMapper::to_create_payload(&command, &plans, &self.money)?;

        info!(
            "Creating objective '{}' over {} months (force={})",
            payload.name,
            plans.len(),
            command.force
        );

        let dto = match self.objective_repository.create_objective(&payload, command.force).await {
            Ok(dto) => dto,
            Err(error) => {
                if error.is_conflict() {
                    warn!("Objective '{}' conflicts with existing budgets", payload.name);
                }
                return Err(error);
            }
        };
        let objective = ObjectiveMapper::to_domain(dto, &self.money)?;
        self.state.write().await.upsert(objective.clone());

        self.refresh_months(&objective.plan_months()).await?;
        if command.category == ObjectiveCategory::AutoCreateByName {
            self.categories.load(true).await?;
        }

        info!("Created objective {}", objective.id);
        Ok(objective)
    }

    /// Update an objective, re-reading both its old and its new plan months
    pub async fn update_objective(
        &self,
        objective_id: &str,
        command: UpdateObjectiveCommand,
    ) -> LedgerResult<Objective> {
        let current = self.get_objective(objective_id).await?;
        if current.status == ObjectiveStatus::Archived {
            return Err(ObjectiveValidationError::Archived.into());
        }
        if let Some(name) = &command.name {
            validate_name(name)?;
        }
        if matches!(&command.category_id, Some(id) if id.trim().is_empty()) {
            return Err(ObjectiveValidationError::EmptyCategory.into());
        }
        validate_total(command.total_amount)?;
        let plans = command.plans.clone().map(normalize_plans).transpose()?;

        let currency = self
            .money
            .resolve_currency(command.currency.as_deref().or(Some(current.currency.as_str())));
        let payload =
            ObjectiveMapper::to_update_payload(&command, plans.as_deref(), &currency, &self.money)?;

        info!("Updating objective {} (force={})", objective_id, command.force);

        let dto = self
            .objective_repository
            .update_objective(objective_id, &payload, command.force)
            .await?;
        let updated = ObjectiveMapper::to_domain(dto, &self.money)?;
        self.state.write().await.upsert(updated.clone());

        let mut touched = current.plan_months();
        touched.extend(updated.plan_months());
        self.refresh_months(&touched).await?;

        Ok(updated)
    }

    /// Mark an active objective as completed
    pub async fn complete_objective(&self, objective_id: &str) -> LedgerResult<Objective> {
        let current = self.get_objective(objective_id).await?;
        if current.status != ObjectiveStatus::Active {
            return Err(ObjectiveValidationError::NotActive(current.status).into());
        }

        info!("Completing objective {}", objective_id);
        let dto = self.objective_repository.complete_objective(objective_id).await?;
        let completed = ObjectiveMapper::to_domain(dto, &self.money)?;
        self.state.write().await.upsert(completed.clone());
        Ok(completed)
    }

    /// Archive an objective; its budget rows disappear from every month it touched
    pub async fn delete_objective(&self, objective_id: &str) -> LedgerResult<()> {
        let current = self.get_objective(objective_id).await?;
        if current.status == ObjectiveStatus::Archived {
            return Err(ObjectiveValidationError::Archived.into());
        }

        info!("Archiving objective {}", objective_id);
        self.objective_repository.delete_objective(objective_id).await?;

        self.refresh_months(&current.plan_months()).await?;
        self.list_objectives(true).await?;
        Ok(())
    }

    /// Planned vs target totals and the per-month overlay reconciliation
    pub async fn funding_state(&self, objective_id: &str) -> LedgerResult<FundingState> {
        let objective = self.get_objective(objective_id).await?;

        let mut months = Vec::with_capacity(objective.plans.len());
        for plan in &objective.plans {
            self.overlay.fetch_month(plan.month, false).await?;
            let entry = self.overlay.entry(plan.month, &objective.category_id).await;
            let owned = entry
                .as_ref()
                .map_or(false, |budget| budget.objective_id.as_deref() == Some(objective.id.as_str()));
            let budgeted = entry.map(|budget| budget.limit);
            months.push(PlanReconciliation {
                month: plan.month,
                kind: plan.kind,
                planned: plan.amount,
                budgeted,
                owned,
                matches: owned && budgeted == Some(plan.amount),
            });
        }

        let planned_total = objective.planned_total();
        Ok(FundingState {
            objective_id: objective.id.clone(),
            status: objective.status,
            planned_total,
            target_total: objective.total_amount,
            unplanned: objective.total_amount.map(|target| target - planned_total),
            months,
        })
    }

    /// Re-read touched months one after another
    async fn refresh_months(&self, months: &BTreeSet<MonthKey>) -> LedgerResult<()> {
        for month in months {
            self.overlay.fetch_month(*month, true).await?;
        }
        debug!("Refreshed {} overlay months", months.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::domain::commands::budgets::UpsertBudgetCommand;
    use crate::backend::storage::test_utils::TestEnvironment;
    use rust_decimal_macros::dec;

    fn month(value: &str) -> MonthKey {
        MonthKey::parse(value).unwrap()
    }

    fn plan(m: &str, amount: Decimal, last: bool) -> ObjectiveMonthPlan {
        ObjectiveMonthPlan {
            month: month(m),
            amount,
            kind: PlanKind::Spend,
            is_last_month: last,
        }
    }

    fn trip(category: ObjectiveCategory, plans: Vec<ObjectiveMonthPlan>, force: bool) -> CreateObjectiveCommand {
        CreateObjectiveCommand {
            name: "Patagonia Trip".to_string(),
            category,
            currency: Some("CLP".to_string()),
            total_amount: Some(dec!(1250000)),
            plans,
            force,
        }
    }

    #[test]
    fn test_distribute_remainder_goes_to_front() {
        assert_eq!(distribute(1_000_000, 3), vec![333_334, 333_333, 333_333]);
        assert_eq!(distribute(10, 4), vec![3, 3, 2, 2]);
        assert_eq!(distribute(0, 2), vec![0, 0]);
        assert!(distribute(5, 0).is_empty());
    }

    #[test]
    fn test_distribute_exactness() {
        for total in 0..200_i64 {
            for count in 1..9_usize {
                let parts = distribute(total, count);
                let floor = total / count as i64;
                let extra = (total % count as i64) as usize;

                assert_eq!(parts.len(), count);
                assert_eq!(parts.iter().sum::<i64>(), total);
                for (index, part) in parts.iter().enumerate() {
                    let expected = if index < extra { floor + 1 } else { floor };
                    assert_eq!(*part, expected, "total={} count={}", total, count);
                }
            }
        }
    }

    #[test]
    fn test_distribute_amount_in_minor_units() {
        let money = MoneyService::default();
        let parts = distribute_amount(&money, dec!(100), 3, "USD").unwrap();
        assert_eq!(parts, vec![dec!(33.34), dec!(33.33), dec!(33.33)]);
        assert_eq!(parts.iter().copied().sum::<Decimal>(), dec!(100));
    }

    #[test]
    fn test_plan_schedule_flags_last_month() {
        let money = MoneyService::default();
        let plans = plan_schedule(&money, dec!(1000000), month("2025-12"), month("2026-02"), PlanKind::Save, "CLP").unwrap();

        assert_eq!(plans.len(), 3);
        assert_eq!(plans[0].amount, dec!(333334));
        assert!(plans[2].is_last_month);
        assert!(!plans[0].is_last_month);
        assert!(plan_schedule(&money, dec!(1), month("2026-02"), month("2026-01"), PlanKind::Save, "CLP").is_err());
    }

    #[test]
    fn test_normalize_plans() {
        let sorted = normalize_plans(vec![plan("2026-02", dec!(1), true), plan("2026-01", dec!(1), false)]).unwrap();
        assert_eq!(sorted[0].month, month("2026-01"));

        assert!(matches!(normalize_plans(vec![]), Err(ObjectiveValidationError::EmptyPlans)));
        assert!(matches!(
            normalize_plans(vec![plan("2026-01", dec!(1), false), plan("2026-01", dec!(2), true)]),
            Err(ObjectiveValidationError::DuplicateMonth(_))
        ));
        assert!(matches!(
            normalize_plans(vec![plan("2026-01", dec!(-1), true)]),
            Err(ObjectiveValidationError::NegativePlanAmount(_))
        ));
    }

    #[tokio::test]
    async fn test_create_projects_plans_into_overlay() {
        let env = TestEnvironment::new().await;
        let planner = env.app.objectives.clone();

        let objective = planner
            .create_objective(trip(
                ObjectiveCategory::AutoCreateByName,
                vec![
                    plan("2026-02", dec!(250000), true),
                    plan("2025-12", dec!(700000), false),
                    plan("2026-01", dec!(300000), false),
                ],
                false,
            ))
            .await
            .unwrap();

        assert_eq!(objective.plans[0].month, month("2025-12"));
        let feb = env.app.budgets.entry(month("2026-02"), &objective.category_id).await.unwrap();
        assert_eq!(feb.objective_id.as_deref(), Some(objective.id.as_str()));
        assert_eq!(feb.purpose.as_deref(), Some("Patagonia Trip"));
        assert_eq!(feb.limit, dec!(250000));
        assert!(!feb.carry_forward_enabled);
        assert!(!feb.is_terminal);

        let categories = env.app.categories.all().await;
        assert!(categories.iter().any(|c| c.id == objective.category_id && c.name == "Patagonia Trip"));

        let funding = planner.funding_state(&objective.id).await.unwrap();
        assert!(funding.is_reconciled());
        assert_eq!(funding.unplanned, Some(dec!(0)));
    }

    #[tokio::test]
    async fn test_conflict_propagates_and_force_replaces() {
        let env = TestEnvironment::new().await;
        env.seed_category("cat-trip", "Trip Conflict").await;
        env.app
            .budgets
            .upsert(UpsertBudgetCommand::new(month("2026-01"), "cat-trip", dec!(100000)))
            .await
            .unwrap();
        let planner = env.app.objectives.clone();
        let plans = vec![plan("2026-01", dec!(300000), true)];

        let conflict = planner
            .create_objective(trip(ObjectiveCategory::Explicit("cat-trip".into()), plans.clone(), false))
            .await;
        match conflict {
            Err(LedgerError::Conflict { message, conflicts }) => {
                assert_eq!(message, "Budget conflicts");
                assert_eq!(conflicts.len(), 1);
                assert_eq!(conflicts[0].month, "2026-01");
            }
            other => panic!("expected conflict, got {:?}", other),
        }
        assert!(planner.list_objectives(true).await.unwrap().is_empty());
        assert_eq!(env.app.budgets.entry(month("2026-01"), "cat-trip").await.unwrap().limit, dec!(100000));

        let objective = planner
            .create_objective(trip(ObjectiveCategory::Explicit("cat-trip".into()), plans, true))
            .await
            .unwrap();
        let jan = env.app.budgets.entry(month("2026-01"), "cat-trip").await.unwrap();
        assert_eq!(jan.limit, dec!(300000));
        assert_eq!(jan.objective_id, Some(objective.id));
    }

    #[tokio::test]
    async fn test_validation_happens_before_network() {
        let env = TestEnvironment::new().await;
        let planner = env.app.objectives.clone();

        let empty = planner.create_objective(trip(ObjectiveCategory::AutoCreateByName, vec![], false)).await;
        assert!(matches!(empty, Err(LedgerError::Validation(_))));

        let mut blank = trip(ObjectiveCategory::AutoCreateByName, vec![plan("2026-01", dec!(1), true)], false);
        blank.name = "   ".to_string();
        assert!(matches!(planner.create_objective(blank).await, Err(LedgerError::Validation(_))));

        assert_eq!(env.connection.objective_writes().await, 0);
    }

    #[tokio::test]
    async fn test_update_refreshes_old_and_new_months() {
        let env = TestEnvironment::new().await;
        env.seed_category("cat-trip", "Trip").await;
        let planner = env.app.objectives.clone();
        let objective = planner
            .create_objective(trip(
                ObjectiveCategory::Explicit("cat-trip".into()),
                vec![plan("2026-01", dec!(500), false), plan("2026-02", dec!(500), true)],
                false,
            ))
            .await
            .unwrap();

        planner
            .update_objective(
                &objective.id,
                UpdateObjectiveCommand {
                    plans: Some(vec![plan("2026-03", dec!(400), false), plan("2026-04", dec!(600), true)]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let budgets = &env.app.budgets;
        assert!(budgets.entry(month("2026-01"), "cat-trip").await.is_none());
        assert!(budgets.entry(month("2026-02"), "cat-trip").await.is_none());
        assert_eq!(budgets.entry(month("2026-03"), "cat-trip").await.unwrap().limit, dec!(400));
        assert_eq!(budgets.entry(month("2026-04"), "cat-trip").await.unwrap().limit, dec!(600));
    }

    #[tokio::test]
    async fn test_complete_is_one_way() {
        let env = TestEnvironment::new().await;
        let planner = env.app.objectives.clone();
        let objective = planner
            .create_objective(trip(ObjectiveCategory::AutoCreateByName, vec![plan("2026-01", dec!(1), true)], false))
            .await
            .unwrap();

        let completed = planner.complete_objective(&objective.id).await.unwrap();
        assert_eq!(completed.status, ObjectiveStatus::Completed);

        let again = planner.complete_objective(&objective.id).await;
        assert!(matches!(again, Err(LedgerError::Validation(_))));
    }

    #[tokio::test]
    async fn test_delete_archives_and_clears_months() {
        let env = TestEnvironment::new().await;
        env.seed_category("cat-trip", "Trip").await;
        let planner = env.app.objectives.clone();
        let objective = planner
            .create_objective(trip(
                ObjectiveCategory::Explicit("cat-trip".into()),
                vec![plan("2026-01", dec!(500), false), plan("2026-02", dec!(500), true)],
                false,
            ))
            .await
            .unwrap();

        planner.delete_objective(&objective.id).await.unwrap();

        assert!(env.app.budgets.entry(month("2026-01"), "cat-trip").await.is_none());
        assert!(env.app.budgets.entry(month("2026-02"), "cat-trip").await.is_none());
        assert!(planner.active_objectives().await.unwrap().is_empty());
        let archived = planner.get_objective(&objective.id).await.unwrap();
        assert_eq!(archived.status, ObjectiveStatus::Archived);
        assert!(planner.complete_objective(&objective.id).await.is_err());
    }

    #[tokio::test]
    async fn test_funding_state_detects_overwritten_month() {
        let env = TestEnvironment::new().await;
        env.seed_category("cat-trip", "Trip").await;
        let planner = env.app.objectives.clone();
        let mut command = trip(
            ObjectiveCategory::Explicit("cat-trip".into()),
            vec![plan("2026-01", dec!(500), false), plan("2026-02", dec!(500), true)],
            false,
        );
        command.total_amount = Some(dec!(1500));
        let objective = planner.create_objective(command).await.unwrap();

        env.app
            .budgets
            .upsert(UpsertBudgetCommand::new(month("2026-02"), "cat-trip", dec!(80)))
            .await
            .unwrap();

        let funding = planner.funding_state(&objective.id).await.unwrap();
        assert!(!funding.is_reconciled());
        assert!(funding.months[0].matches);
        assert!(!funding.months[1].owned);
        assert_eq!(funding.unplanned, Some(dec!(500)));
    }
}
