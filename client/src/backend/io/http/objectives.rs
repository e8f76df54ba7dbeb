use async_trait::async_trait;
use reqwest::{Method, RequestBuilder};
use shared::{ApiObjective, CreateObjectivePayload, DeletedResponse, UpdateObjectivePayload};

use super::RestClient;
use crate::backend::domain::error::LedgerResult;
use crate::backend::storage::traits::ObjectiveStorage;

#[derive(Clone)]
pub struct HttpObjectiveRepository {
    client: RestClient,
}

impl HttpObjectiveRepository {
    pub fn new(client: RestClient) -> Self {
        Self { client }
    }
}

fn with_force(request: RequestBuilder, force: bool) -> RequestBuilder {
    if force {
        request.query(&[("force", "true")])
    } else {
        request
    }
}

#[async_trait]
impl ObjectiveStorage for HttpObjectiveRepository {
    async fn list_objectives(&self) -> LedgerResult<Vec<ApiObjective>> {
        let request = self.client.request(Method::GET, &["objectives"]);
        self.client.send(request).await
    }

    async fn create_objective(&self, payload: &CreateObjectivePayload, force: bool) -> LedgerResult<ApiObjective> {
        let request = self.client.request(Method::POST, &["objectives"]).json(payload);
        self.client.send(with_force(request, force)).await
    }

    async fn update_objective(
        &self,
        objective_id: &str,
        payload: &UpdateObjectivePayload,
        force: bool,
    ) -> LedgerResult<ApiObjective> {
        let request = self
            .client
            .request(Method::PATCH, &["objectives", objective_id])
            .json(payload);
        self.client.send(with_force(request, force)).await
    }

    async fn complete_objective(&self, objective_id: &str) -> LedgerResult<ApiObjective> {
        let request = self
            .client
            .request(Method::POST, &["objectives", objective_id, "complete"]);
        self.client.send(request).await
    }

    async fn delete_objective(&self, objective_id: &str) -> LedgerResult<DeletedResponse> {
        let request = self.client.request(Method::DELETE, &["objectives", objective_id]);
        self.client.send(request).await
    }
}
