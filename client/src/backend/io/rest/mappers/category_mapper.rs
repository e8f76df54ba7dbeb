use shared::{ApiCategory, CategoryPayload};

use crate::backend::domain::commands::categories::{CreateCategoryCommand, UpdateCategoryCommand};
use crate::backend::domain::error::LedgerResult;
use crate::backend::domain::models::category::Category;
use crate::backend::domain::money::MoneyService;

/// Categories carry no currency of their own; default limits are expressed in
/// the configured default currency.
pub struct CategoryMapper;

impl CategoryMapper {
    pub fn to_domain(dto: ApiCategory, money: &MoneyService) -> Category {
        Category {
            id: dto.category_id,
            name: dto.name,
            group: dto.group,
            icon: dto.icon,
            color: dto.color,
            rollover: dto.rollover,
            rollover_target_category_id: dto.rollover_target_category_id,
            default_limit: money.from_minor(dto.monthly_budget.unwrap_or(0), money.default_currency()),
        }
    }

    pub fn to_domain_list(dtos: Vec<ApiCategory>, money: &MoneyService) -> Vec<Category> {
        dtos.into_iter().map(|dto| Self::to_domain(dto, money)).collect()
    }

    pub fn to_create_payload(command: &CreateCategoryCommand, money: &MoneyService) -> LedgerResult<CategoryPayload> {
        Ok(CategoryPayload {
            name: Some(command.name.trim().to_string()),
            group: command.group.clone(),
            icon: command.icon.clone(),
            color: command.color.clone(),
            rollover: Some(command.rollover),
            rollover_target_category_id: command.rollover_target_category_id.clone().map(Some),
            monthly_budget: Some(money.to_minor(command.default_limit, money.default_currency())?),
        })
    }

    pub fn to_update_payload(command: &UpdateCategoryCommand, money: &MoneyService) -> LedgerResult<CategoryPayload> {
        let monthly_budget = match command.default_limit {
            Some(limit) => Some(money.to_minor(limit, money.default_currency())?),
            None => None,
        };
        Ok(CategoryPayload {
            name: command.name.as_ref().map(|name| name.trim().to_string()),
            group: command.group.clone(),
            icon: command.icon.clone(),
            color: command.color.clone(),
            rollover: command.rollover,
            rollover_target_category_id: command.rollover_target_category_id.clone(),
            monthly_budget,
        })
    }
}
