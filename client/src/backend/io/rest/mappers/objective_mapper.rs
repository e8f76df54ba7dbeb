use shared::{ApiObjective, ApiObjectiveMonthPlan, CreateObjectivePayload, UpdateObjectivePayload};

use super::decode_month;
use crate::backend::domain::commands::objectives::{CreateObjectiveCommand, UpdateObjectiveCommand};
use crate::backend::domain::error::LedgerResult;
use crate::backend::domain::models::objective::{Objective, ObjectiveMonthPlan};
use crate::backend::domain::money::MoneyService;

pub struct ObjectiveMapper;

impl ObjectiveMapper {
    pub fn to_domain(dto: ApiObjective, money: &MoneyService) -> LedgerResult<Objective> {
        let currency = money.resolve_currency(dto.currency.as_deref());
        let mut plans = dto
            .plans
            .into_iter()
            .map(|plan| {
                Ok(ObjectiveMonthPlan {
                    month: decode_month(&plan.month, "objective plan")?,
                    amount: money.from_minor(plan.amount, &currency),
                    kind: plan.kind,
                    is_last_month: plan.is_last_month,
                })
            })
            .collect::<LedgerResult<Vec<_>>>()?;
        plans.sort_by_key(|plan| plan.month);

        Ok(Objective {
            id: dto.objective_id,
            name: dto.name,
            category_id: dto.category_id,
            total_amount: dto.total_amount.map(|total| money.from_minor(total, &currency)),
            currency,
            status: dto.status,
            plans,
            created_at: dto.created_at,
            updated_at: dto.updated_at,
        })
    }

    pub fn to_domain_list(dtos: Vec<ApiObjective>, money: &MoneyService) -> LedgerResult<Vec<Objective>> {
        dtos.into_iter().map(|dto| Self::to_domain(dto, money)).collect()
    }

    pub fn plans_to_dto(
        plans: &[ObjectiveMonthPlan],
        currency: &str,
        money: &MoneyService,
    ) -> LedgerResult<Vec<ApiObjectiveMonthPlan>> {
        plans
            .iter()
            .map(|plan| {
                Ok(ApiObjectiveMonthPlan {
                    month: plan.month.to_string(),
                    amount: money.to_minor(plan.amount, currency)?,
                    kind: plan.kind,
                    is_last_month: plan.is_last_month,
                })
            })
            .collect()
    }

    /// `plans` must already be normalised (ascending, unique months)
    pub fn to_create_payload(
        command: &CreateObjectiveCommand,
        plans: &[ObjectiveMonthPlan],
        money: &MoneyService,
    ) -> LedgerResult<CreateObjectivePayload> {
        let currency = money.resolve_currency(command.currency.as_deref());
        let total_amount = match command.total_amount {
            Some(total) => Some(money.to_minor(total, &currency)?),
            None => None,
        };
        Ok(CreateObjectivePayload {
            name: command.name.trim().to_string(),
            category_id: command.category.explicit_id().map(str::to_string),
            plans: Self::plans_to_dto(plans, &currency, money)?,
            currency: Some(currency),
            total_amount,
        })
    }

    /// `currency` is the objective's effective currency after the update
    pub fn to_update_payload(
        command: &UpdateObjectiveCommand,
        plans: Option<&[ObjectiveMonthPlan]>,
        currency: &str,
        money: &MoneyService,
    ) -> LedgerResult<UpdateObjectivePayload> {
        let total_amount = match command.total_amount {
            Some(total) => Some(money.to_minor(total, currency)?),
            None => None,
        };
        let plans = match plans {
            Some(plans) => Some(Self::plans_to_dto(plans, currency, money)?),
            None => None,
        };
        Ok(UpdateObjectivePayload {
            name: command.name.as_ref().map(|name| name.trim().to_string()),
            category_id: command.category_id.clone(),
            currency: command.currency.as_ref().map(|_| currency.to_string()),
            total_amount,
            status: None,
            plans,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::domain::models::objective::ObjectiveCategory;
    use crate::backend::domain::month::MonthKey;
    use rust_decimal_macros::dec;
    use shared::{ObjectiveStatus, PlanKind};

    #[test]
    fn test_auto_category_sends_null() {
        let money = MoneyService::default();
        let plan = ObjectiveMonthPlan {
            month: MonthKey::parse("2026-01").unwrap(),
            amount: dec!(300000),
            kind: PlanKind::Spend,
            is_last_month: true,
        };
        let command = CreateObjectiveCommand {
            name: "  Patagonia Trip ".to_string(),
            category: ObjectiveCategory::AutoCreateByName,
            currency: None,
            total_amount: Some(dec!(300000)),
            plans: vec![plan.clone()],
            force: false,
        };

        let payload = ObjectiveMapper::to_create_payload(&command, &[plan], &money).unwrap();
        let json = serde_json::to_value(&payload).unwrap();

        assert_eq!(json["categoryId"], serde_json::Value::Null);
        assert_eq!(json["name"], "Patagonia Trip");
        assert_eq!(json["currency"], "CLP");
        assert_eq!(json["plans"][0]["amount"], 300000);
    }

    #[test]
    fn test_to_domain_sorts_plans() {
        let money = MoneyService::default();
        let dto = ApiObjective {
            objective_id: "obj-1".to_string(),
            name: "Laptop".to_string(),
            category_id: "cat-1".to_string(),
            currency: Some("USD".to_string()),
            total_amount: Some(150000),
            status: ObjectiveStatus::Active,
            plans: vec![
                ApiObjectiveMonthPlan { month: "2026-02".into(), amount: 75000, kind: PlanKind::Save, is_last_month: true },
                ApiObjectiveMonthPlan { month: "2026-01".into(), amount: 75000, kind: PlanKind::Save, is_last_month: false },
            ],
            created_at: None,
            updated_at: None,
        };

        let objective = ObjectiveMapper::to_domain(dto, &money).unwrap();
        assert_eq!(objective.total_amount, Some(dec!(1500)));
        assert_eq!(objective.plans[0].month.to_string(), "2026-01");
        assert_eq!(objective.plans[0].amount, dec!(750));
    }
}
