use shared::ApiBudget;

use super::decode_month;
use crate::backend::domain::error::LedgerResult;
use crate::backend::domain::models::budget::Budget;
use crate::backend::domain::money::MoneyService;

pub struct BudgetMapper;

impl BudgetMapper {
    pub fn to_domain(dto: ApiBudget, money: &MoneyService) -> LedgerResult<Budget> {
        let currency = money.resolve_currency(dto.currency.as_deref());
        let month = decode_month(&dto.month, "budget")?;
        let copied_from_month = match dto.copied_from_month.as_deref() {
            Some(source) => Some(decode_month(source, "budget copiedFromMonth")?),
            None => None,
        };

        Ok(Budget {
            month,
            category_id: dto.category_id,
            limit: money.from_minor(dto.limit, &currency),
            rollover: dto.rollover,
            rollover_target_category_id: dto.rollover_target_category_id,
            currency,
            purpose: dto.purpose,
            carry_forward_enabled: dto.carry_forward_enabled,
            is_terminal: dto.is_terminal,
            objective_id: dto.objective_id,
            copied_from_month,
        })
    }

    pub fn to_dto(domain: &Budget, money: &MoneyService) -> LedgerResult<ApiBudget> {
        Ok(ApiBudget {
            month: domain.month.to_string(),
            category_id: domain.category_id.clone(),
            limit: money.to_minor(domain.limit, &domain.currency)?,
            rollover: domain.rollover,
            rollover_target_category_id: domain.rollover_target_category_id.clone(),
            currency: Some(domain.currency.clone()),
            copied_from_month: domain.copied_from_month.map(|month| month.to_string()),
            purpose: domain.purpose.clone(),
            carry_forward_enabled: domain.carry_forward_enabled,
            is_terminal: domain.is_terminal,
            objective_id: domain.objective_id.clone(),
        })
    }

    pub fn to_domain_list(dtos: Vec<ApiBudget>, money: &MoneyService) -> LedgerResult<Vec<Budget>> {
        dtos.into_iter().map(|dto| Self::to_domain(dto, money)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::domain::error::LedgerError;
    use rust_decimal_macros::dec;

    fn api_budget(month: &str, limit: i64, currency: Option<&str>) -> ApiBudget {
        ApiBudget {
            month: month.to_string(),
            category_id: "cat-1".to_string(),
            limit,
            rollover: true,
            rollover_target_category_id: Some("cat-2".to_string()),
            currency: currency.map(str::to_string),
            copied_from_month: Some("2026-02".to_string()),
            purpose: None,
            carry_forward_enabled: true,
            is_terminal: false,
            objective_id: None,
        }
    }

    #[test]
    fn test_minor_units_converted_per_currency() {
        let money = MoneyService::default();

        let usd = BudgetMapper::to_domain(api_budget("2026-03", 12345, Some("USD")), &money).unwrap();
        assert_eq!(usd.limit, dec!(123.45));

        let clp = BudgetMapper::to_domain(api_budget("2026-03", 60000, None), &money).unwrap();
        assert_eq!(clp.currency, "CLP");
        assert_eq!(clp.limit, dec!(60000));
        assert_eq!(clp.copied_from_month.unwrap().to_string(), "2026-02");

        let back = BudgetMapper::to_dto(&usd, &money).unwrap();
        assert_eq!(back.limit, 12345);
        assert_eq!(back.currency.as_deref(), Some("USD"));
    }

    #[test]
    fn test_malformed_month_is_decode_error() {
        let money = MoneyService::default();
        let result = BudgetMapper::to_domain(api_budget("March", 1, None), &money);
        assert!(matches!(result, Err(LedgerError::Decode(_))));
    }
}
