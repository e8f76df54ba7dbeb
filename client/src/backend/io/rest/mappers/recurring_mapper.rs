use shared::{ApiBill, ApiRecurring, RecurringPayload};

use crate::backend::domain::commands::recurring::SaveRecurringCommand;
use crate::backend::domain::error::{LedgerError, LedgerResult};
use crate::backend::domain::models::recurring::{BillInstance, BillStatus, RecurringPayment};
use crate::backend::domain::money::MoneyService;

pub struct RecurringMapper;

impl RecurringMapper {
    pub fn rule_to_domain(dto: ApiRecurring, money: &MoneyService) -> RecurringPayment {
        let currency = money.resolve_currency(Some(&dto.currency));
        RecurringPayment {
            id: dto.rule_id,
            name: dto.name,
            amount: money.from_minor(dto.amount, &currency),
            currency,
            category_id: dto.category_id,
            cadence: dto.cadence,
            day_of_month: dto.day_of_month,
            start_date: dto.start_date,
            end_date: dto.end_date,
            autopost_mode: dto.autopost_mode,
            paused: dto.is_paused,
        }
    }

    pub fn to_payload(command: &SaveRecurringCommand, money: &MoneyService) -> LedgerResult<RecurringPayload> {
        let currency = money.resolve_currency(command.currency.as_deref());
        Ok(RecurringPayload {
            name: command.name.trim().to_string(),
            amount: money.to_minor(command.amount, &currency)?,
            currency,
            category_id: command.category_id.clone(),
            cadence: command.cadence.clone(),
            day_of_month: command.day_of_month,
            start_date: command.start_date.clone(),
            end_date: command.end_date.clone(),
            autopost_mode: command.autopost_mode.clone(),
            is_paused: command.paused,
        })
    }

    /// A bill without a status is still projected
    pub fn bill_to_domain(dto: ApiBill, money: &MoneyService) -> LedgerResult<BillInstance> {
        let currency = money.resolve_currency(dto.currency.as_deref());
        let status = match dto.status.as_deref() {
            Some(status) => BillStatus::from_string(status)
                .map_err(|e| LedgerError::Decode(format!("bill {}: {}", dto.bill_id, e)))?,
            None => BillStatus::Projected,
        };
        Ok(BillInstance {
            id: dto.bill_id,
            rule_id: dto.rule_id,
            name: dto.name,
            due_date: dto.due_date,
            amount: dto.amount.map(|amount| money.from_minor(amount, &currency)),
            currency,
            category_id: dto.category_id,
            status,
            linked_transaction_id: dto.linked_txn_id,
        })
    }
}
