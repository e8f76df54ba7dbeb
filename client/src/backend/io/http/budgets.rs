use async_trait::async_trait;
use reqwest::Method;
use shared::{ApiBudget, BudgetDeleteScope, DeletedResponse};

use super::RestClient;
use crate::backend::domain::error::LedgerResult;
use crate::backend::storage::traits::BudgetStorage;

#[derive(Clone)]
pub struct HttpBudgetRepository {
    client: RestClient,
}

impl HttpBudgetRepository {
    pub fn new(client: RestClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl BudgetStorage for HttpBudgetRepository {
    async fn list_budgets(&self, month: &str) -> LedgerResult<Vec<ApiBudget>> {
        let request = self
            .client
            .request(Method::GET, &["budgets"])
            .query(&[("month", month)]);
        self.client.send(request).await
    }

    async fn upsert_budget(&self, budget: &ApiBudget, apply_future: bool) -> LedgerResult<ApiBudget> {
        let mut request = self
            .client
            .request(Method::PUT, &["budgets", &budget.month, &budget.category_id])
            .json(budget);
        if apply_future {
            request = request.query(&[("applyFuture", "true")]);
        }
        self.client.send(request).await
    }

    async fn delete_budget(&self, month: &str, category_id: &str) -> LedgerResult<DeletedResponse> {
        let request = self
            .client
            .request(Method::DELETE, &["budgets", month, category_id]);
        self.client.send(request).await
    }

    async fn delete_budget_scoped(
        &self,
        category_id: &str,
        scope: BudgetDeleteScope,
        month: &str,
    ) -> LedgerResult<DeletedResponse> {
        let request = self
            .client
            .request(Method::DELETE, &["budgets", "scope"])
            .query(&[("scope", scope.as_str()), ("categoryId", category_id), ("month", month)]);
        self.client.send(request).await
    }

    async fn copy_budgets(&self, month: &str, source_month: &str) -> LedgerResult<Vec<ApiBudget>> {
        let request = self
            .client
            .request(Method::POST, &["budgets", month, "copy-from", source_month]);
        self.client.send(request).await
    }
}
