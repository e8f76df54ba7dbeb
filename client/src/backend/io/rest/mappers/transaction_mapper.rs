use shared::{ApiTransaction, ApiTransactionSplit, TransactionPayload};

use crate::backend::domain::commands::transactions::SaveTransactionCommand;
use crate::backend::domain::error::LedgerResult;
use crate::backend::domain::models::transaction::{Transaction, TransactionSplit};
use crate::backend::domain::money::MoneyService;

pub struct TransactionMapper;

impl TransactionMapper {
    pub fn to_domain(dto: ApiTransaction, money: &MoneyService) -> Transaction {
        let currency = money.resolve_currency(dto.currency.as_deref());
        let splits = dto
            .splits
            .into_iter()
            .map(|split| TransactionSplit {
                id: split.id,
                label: split.label,
                amount: money.from_minor(split.amount, &currency),
                category_id: split.category_id,
            })
            .collect();

        Transaction {
            id: dto.txn_id,
            date: dto.date,
            merchant: dto.merchant,
            description: dto.description,
            amount: money.from_minor(dto.amount, &currency),
            currency,
            category_id: dto.category_id,
            notes: dto.notes,
            source: dto.source,
            receipt_id: dto.receipt_id,
            splits,
        }
    }

    pub fn to_domain_list(dtos: Vec<ApiTransaction>, money: &MoneyService) -> Vec<Transaction> {
        dtos.into_iter().map(|dto| Self::to_domain(dto, money)).collect()
    }

    pub fn to_payload(command: &SaveTransactionCommand, money: &MoneyService) -> LedgerResult<TransactionPayload> {
        let currency = money.resolve_currency(command.currency.as_deref());
        let splits = command
            .splits
            .iter()
            .map(|split| {
                Ok(ApiTransactionSplit {
                    id: split.id.clone(),
                    label: split.label.clone(),
                    amount: money.to_minor(split.amount, &currency)?,
                    category_id: split.category_id.clone(),
                })
            })
            .collect::<LedgerResult<Vec<_>>>()?;

        Ok(TransactionPayload {
            date: command.date.clone(),
            merchant: command.merchant.clone(),
            description: command.description.clone(),
            amount: money.to_minor(command.amount, &currency)?,
            currency: Some(currency),
            category_id: command.category_id.clone(),
            notes: command.notes.clone(),
            source: Some("manual".to_string()),
            receipt_id: command.receipt_id.clone(),
            splits,
        })
    }
}
