//! Transaction list for the selected date window.
use crate::backend::{
    domain::{
        commands::transactions::{SaveTransactionCommand, TransactionListQuery},
        error::{LedgerError, LedgerResult},
        models::transaction::Transaction,
        money::MoneyService,
        month::MonthKey,
        optimistic::{run_optimistic, EntityList},
    },
    io::rest::mappers::transaction_mapper::TransactionMapper,
    storage::{Connection, TransactionStorage},
};
use shared::TransactionListRequest;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Clone)]
pub struct TransactionService<C: Connection> {
    transaction_repository: C::TransactionRepository,
    money: MoneyService,
    state: Arc<RwLock<EntityList<Transaction>>>,
}

impl<C: Connection> TransactionService<C> {
    pub fn new(connection: Arc<C>, money: MoneyService) -> Self {
        let transaction_repository = connection.create_transaction_repository();
        Self {
            transaction_repository,
            money,
            state: Arc::new(RwLock::new(EntityList::default())),
        }
    }

    /// Replace the local list with the store's transactions for `query`
    pub async fn load(&self, query: TransactionListQuery) -> LedgerResult<Vec<Transaction>> {
        let request = TransactionListRequest {
            date_from: query.date_from,
            date_to: query.date_to,
            category_id: query.category_id,
            limit: query.limit,
        };
        let dtos = self.transaction_repository.list_transactions(&request).await?;
        let mut transactions = TransactionMapper::to_domain_list(dtos, &self.money);
        transactions.sort_by(|a, b| b.date.cmp(&a.date));
        debug!(
            "Loaded {} transactions ({:?}..{:?})",
            transactions.len(),
            request.date_from,
            request.date_to
        );

        let mut state = self.state.write().await;
        state.replace_all(transactions);
        Ok(state.items().to_vec())
    }

    /// Load every transaction dated in `month`
    pub async fn load_month(&self, month: MonthKey) -> LedgerResult<Vec<Transaction>> {
        self.load(TransactionListQuery {
            date_from: Some(month.first_day()),
            date_to: Some(month.last_day()),
            ..Default::default()
        })
        .await
    }

    pub async fn all(&self) -> Vec<Transaction> {
        self.state.read().await.items().to_vec()
    }

    pub async fn in_month(&self, month: MonthKey) -> Vec<Transaction> {
        self.state
            .read()
            .await
            .items()
            .iter()
            .filter(|transaction| transaction.in_month(month))
            .cloned()
            .collect()
    }

    /// Expenses still waiting for a category
    pub async fn uncategorized(&self) -> Vec<Transaction> {
        self.state
            .read()
            .await
            .items()
            .iter()
            .filter(|transaction| transaction.is_uncategorized())
            .cloned()
            .collect()
    }

    pub async fn add(&self, command: SaveTransactionCommand) -> LedgerResult<Transaction> {
        command.validate()?;
        let payload = TransactionMapper::to_payload(&command, &self.money)?;

        let temp_id = format!("tmp-{}", Uuid::new_v4());
        let local = self.local_transaction(temp_id.clone(), &command);

        info!("Creating transaction on {} for {}", command.date, command.amount);
        let dto = run_optimistic(
            &self.state,
            |_| vec![temp_id.clone()],
            move |list| list.upsert(local),
            self.transaction_repository.create_transaction(&payload),
        )
        .await?;

        let created = TransactionMapper::to_domain(dto, &self.money);
        self.state.write().await.replace_id(&temp_id, created.clone());
        Ok(created)
    }

    /// Replace a transaction's editable fields
    pub async fn update(&self, transaction_id: &str, command: SaveTransactionCommand) -> LedgerResult<Transaction> {
        command.validate()?;
        let current = self.find(transaction_id).await?;
        let payload = TransactionMapper::to_payload(&command, &self.money)?;

        let mut local = self.local_transaction(current.id.clone(), &command);
        local.source = current.source.clone();

        info!("Updating transaction {}", transaction_id);
        let dto = run_optimistic(
            &self.state,
            |_| vec![transaction_id.to_string()],
            move |list| list.upsert(local),
            self.transaction_repository
                .update_transaction(transaction_id, &current.date, &payload),
        )
        .await?;

        let updated = TransactionMapper::to_domain(dto, &self.money);
        self.state.write().await.upsert(updated.clone());
        Ok(updated)
    }

    pub async fn delete(&self, transaction_id: &str) -> LedgerResult<()> {
        let current = self.find(transaction_id).await?;

        info!("Deleting transaction {}", transaction_id);
        run_optimistic(
            &self.state,
            |_| vec![transaction_id.to_string()],
            |list| {
                list.remove(transaction_id);
            },
            self.transaction_repository
                .delete_transaction(transaction_id, &current.date),
        )
        .await?;
        Ok(())
    }

    async fn find(&self, transaction_id: &str) -> LedgerResult<Transaction> {
        self.state
            .read()
            .await
            .get(transaction_id)
            .cloned()
            .ok_or_else(|| LedgerError::not_found(format!("Transaction {}", transaction_id)))
    }

    fn local_transaction(&self, id: String, command: &SaveTransactionCommand) -> Transaction {
        let currency = self.money.resolve_currency(command.currency.as_deref());
        let mut splits = command.splits.clone();
        for split in &mut splits {
            split.amount = self.money.round(split.amount, &currency);
        }
        Transaction {
            id,
            date: command.date.clone(),
            merchant: command.merchant.clone(),
            description: command.description.clone(),
            amount: self.money.round(command.amount, &currency),
            currency,
            category_id: command.category_id.clone(),
            notes: command.notes.clone(),
            source: Some("manual".to_string()),
            receipt_id: command.receipt_id.clone(),
            splits,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::domain::models::transaction::TransactionSplit;
    use crate::backend::storage::test_utils::TestEnvironment;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn expense(date: &str, amount: Decimal, category: Option<&str>) -> SaveTransactionCommand {
        SaveTransactionCommand {
            date: date.to_string(),
            merchant: Some("Corner Shop".to_string()),
            description: None,
            amount,
            currency: None,
            category_id: category.map(str::to_string),
            notes: None,
            receipt_id: None,
            splits: Vec::new(),
        }
    }

    fn split(amount: Decimal, category: Option<&str>) -> TransactionSplit {
        TransactionSplit {
            id: Uuid::new_v4().to_string(),
            label: "part".to_string(),
            amount,
            category_id: category.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_add_and_filter_by_month() {
        let env = TestEnvironment::new().await;
        let service = env.app.transactions.clone();

        service.add(expense("2026-03-04", dec!(-12000), Some("cat-1"))).await.unwrap();
        service.add(expense("2026-04-01", dec!(-500), None)).await.unwrap();

        let march = service.in_month(MonthKey::parse("2026-03").unwrap()).await;
        assert_eq!(march.len(), 1);
        assert!(!march[0].id.starts_with("tmp-"));

        let reloaded = service.load_month(MonthKey::parse("2026-04").unwrap()).await.unwrap();
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded[0].amount, dec!(-500));
    }

    #[tokio::test]
    async fn test_uncategorized_excludes_income_and_split_expenses() {
        let env = TestEnvironment::new().await;
        let service = env.app.transactions.clone();

        service.add(expense("2026-03-01", dec!(-100), None)).await.unwrap();
        service.add(expense("2026-03-02", dec!(900000), None)).await.unwrap();
        let mut with_splits = expense("2026-03-03", dec!(-90), None);
        with_splits.splits = vec![split(dec!(-60), Some("cat-2")), split(dec!(-30), None)];
        service.add(with_splits).await.unwrap();

        let uncategorized = service.uncategorized().await;
        assert_eq!(uncategorized.len(), 1);
        assert_eq!(uncategorized[0].amount, dec!(-100));
    }

    #[tokio::test]
    async fn test_split_sum_must_match_amount() {
        let env = TestEnvironment::new().await;
        let mut command = expense("2026-03-03", dec!(-90), None);
        command.splits = vec![split(dec!(-60), Some("cat-2")), split(dec!(-20), None)];

        let result = env.app.transactions.add(command).await;
        assert!(matches!(result, Err(LedgerError::Validation(_))));

        let bad_date = env.app.transactions.add(expense("2026-13-01", dec!(-1), None)).await;
        assert!(matches!(bad_date, Err(LedgerError::Validation(_))));
    }

    #[tokio::test]
    async fn test_failed_update_restores_previous_version() {
        let env = TestEnvironment::new().await;
        let service = env.app.transactions.clone();
        let created = service.add(expense("2026-03-04", dec!(-12000), Some("cat-1"))).await.unwrap();

        env.connection.fail_next(LedgerError::Network("offline".to_string())).await;
        let result = service
            .update(&created.id, expense("2026-03-04", dec!(-15000), Some("cat-1")))
            .await;

        assert!(result.is_err());
        assert_eq!(service.all().await, vec![created.clone()]);

        service.delete(&created.id).await.unwrap();
        assert!(service.all().await.is_empty());
    }
}
