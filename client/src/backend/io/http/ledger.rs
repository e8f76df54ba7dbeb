use async_trait::async_trait;
use reqwest::Method;
use shared::{
    ApiBill, ApiCategory, ApiRecurring, ApiRecurringToggle, ApiTransaction, BillUpdatePayload,
    CategoryPayload, DeletedResponse, RecurringPayload, TransactionListRequest, TransactionPayload,
};

use super::RestClient;
use crate::backend::domain::error::LedgerResult;
use crate::backend::storage::traits::{CategoryStorage, RecurringStorage, TransactionStorage};

#[derive(Clone)]
pub struct HttpCategoryRepository {
    client: RestClient,
}

impl HttpCategoryRepository {
    pub fn new(client: RestClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CategoryStorage for HttpCategoryRepository {
    async fn list_categories(&self) -> LedgerResult<Vec<ApiCategory>> {
        let request = self.client.request(Method::GET, &["categories"]);
        self.client.send(request).await
    }

    async fn create_category(&self, payload: &CategoryPayload) -> LedgerResult<ApiCategory> {
        let request = self.client.request(Method::POST, &["categories"]).json(payload);
        self.client.send(request).await
    }

    async fn update_category(&self, category_id: &str, payload: &CategoryPayload) -> LedgerResult<ApiCategory> {
        let request = self
            .client
            .request(Method::PATCH, &["categories", category_id])
            .json(payload);
        self.client.send(request).await
    }

    async fn delete_category(&self, category_id: &str) -> LedgerResult<DeletedResponse> {
        let request = self.client.request(Method::DELETE, &["categories", category_id]);
        self.client.send(request).await
    }
}

#[derive(Clone)]
pub struct HttpTransactionRepository {
    client: RestClient,
}

impl HttpTransactionRepository {
    pub fn new(client: RestClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl TransactionStorage for HttpTransactionRepository {
    async fn list_transactions(&self, request: &TransactionListRequest) -> LedgerResult<Vec<ApiTransaction>> {
        let request = self.client.request(Method::GET, &["transactions"]).query(request);
        self.client.send(request).await
    }

    async fn create_transaction(&self, payload: &TransactionPayload) -> LedgerResult<ApiTransaction> {
        let request = self.client.request(Method::POST, &["transactions"]).json(payload);
        self.client.send(request).await
    }

    async fn update_transaction(
        &self,
        transaction_id: &str,
        date: &str,
        payload: &TransactionPayload,
    ) -> LedgerResult<ApiTransaction> {
        let request = self
            .client
            .request(Method::PATCH, &["transactions", transaction_id])
            .query(&[("date", date)])
            .json(payload);
        self.client.send(request).await
    }

    async fn delete_transaction(&self, transaction_id: &str, date: &str) -> LedgerResult<DeletedResponse> {
        let request = self
            .client
            .request(Method::DELETE, &["transactions", transaction_id])
            .query(&[("date", date)]);
        self.client.send(request).await
    }
}

#[derive(Clone)]
pub struct HttpRecurringRepository {
    client: RestClient,
}

impl HttpRecurringRepository {
    pub fn new(client: RestClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RecurringStorage for HttpRecurringRepository {
    async fn list_recurring(&self) -> LedgerResult<Vec<ApiRecurring>> {
        let request = self.client.request(Method::GET, &["recurring"]);
        self.client.send(request).await
    }

    async fn create_recurring(&self, payload: &RecurringPayload) -> LedgerResult<ApiRecurring> {
        let request = self.client.request(Method::POST, &["recurring"]).json(payload);
        self.client.send(request).await
    }

    async fn update_recurring(&self, rule_id: &str, payload: &RecurringPayload) -> LedgerResult<ApiRecurring> {
        let request = self
            .client
            .request(Method::PATCH, &["recurring", rule_id])
            .json(payload);
        self.client.send(request).await
    }

    async fn pause_recurring(&self, rule_id: &str) -> LedgerResult<ApiRecurringToggle> {
        let request = self.client.request(Method::POST, &["recurring", rule_id, "pause"]);
        self.client.send(request).await
    }

    async fn resume_recurring(&self, rule_id: &str) -> LedgerResult<ApiRecurringToggle> {
        let request = self.client.request(Method::POST, &["recurring", rule_id, "resume"]);
        self.client.send(request).await
    }

    async fn stop_recurring(&self, rule_id: &str) -> LedgerResult<ApiRecurringToggle> {
        let request = self.client.request(Method::POST, &["recurring", rule_id, "stop"]);
        self.client.send(request).await
    }

    async fn list_bills(&self, date_from: &str, date_to: &str) -> LedgerResult<Vec<ApiBill>> {
        let request = self
            .client
            .request(Method::GET, &["bills"])
            .query(&[("date_from", date_from), ("date_to", date_to)]);
        self.client.send(request).await
    }

    async fn update_bill(&self, bill_id: &str, payload: &BillUpdatePayload) -> LedgerResult<ApiBill> {
        let request = self
            .client
            .request(Method::PATCH, &["bills", bill_id])
            .json(payload);
        self.client.send(request).await
    }
}
