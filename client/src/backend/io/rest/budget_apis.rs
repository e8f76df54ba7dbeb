//! # REST API for Budgets
//!
//! Month-scoped budget entries, scoped deletes and month copies.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{delete, get, post, put},
    Router,
};
use serde::Deserialize;
use shared::{ApiBudget, BudgetDeleteScope};
use tracing::info;

use super::{error_response, RestState};
use crate::backend::storage::traits::{BudgetStorage, Connection};

#[derive(Debug, Deserialize)]
pub struct MonthQuery {
    pub month: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertQuery {
    #[serde(default)]
    pub apply_future: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScopeQuery {
    pub scope: BudgetDeleteScope,
    pub category_id: String,
    pub month: String,
}

pub fn router<C: Connection>() -> Router<RestState<C>> {
    Router::new()
        .route("/budgets", get(list_budgets::<C>))
        .route("/budgets/scope", delete(delete_budget_scoped::<C>))
        .route(
            "/budgets/:month/:category_id",
            put(upsert_budget::<C>).delete(delete_budget::<C>),
        )
        .route("/budgets/:month/copy-from/:source_month", post(copy_budgets::<C>))
}

/// List the entries visible in one month
pub async fn list_budgets<C: Connection>(
    State(state): State<RestState<C>>,
    Query(query): Query<MonthQuery>,
) -> Response {
    info!("GET /api/v1/budgets?month={}", query.month);

    match state.budgets.list_budgets(&query.month).await {
        Ok(budgets) => (StatusCode::OK, Json(budgets)).into_response(),
        Err(e) => error_response(e),
    }
}

/// Create or replace one entry; the path wins over the body's month and category
pub async fn upsert_budget<C: Connection>(
    State(state): State<RestState<C>>,
    Path((month, category_id)): Path<(String, String)>,
    Query(query): Query<UpsertQuery>,
    Json(mut budget): Json<ApiBudget>,
) -> Response {
    info!(
        "PUT /api/v1/budgets/{}/{} applyFuture={}",
        month, category_id, query.apply_future
    );

    budget.month = month;
    budget.category_id = category_id;
    match state.budgets.upsert_budget(&budget, query.apply_future).await {
        Ok(saved) => (StatusCode::OK, Json(saved)).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn delete_budget<C: Connection>(
    State(state): State<RestState<C>>,
    Path((month, category_id)): Path<(String, String)>,
) -> Response {
    info!("DELETE /api/v1/budgets/{}/{}", month, category_id);

    match state.budgets.delete_budget(&month, &category_id).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn delete_budget_scoped<C: Connection>(
    State(state): State<RestState<C>>,
    Query(query): Query<ScopeQuery>,
) -> Response {
    info!(
        "DELETE /api/v1/budgets/scope - {} {} from {}",
        query.category_id, query.scope, query.month
    );

    match state
        .budgets
        .delete_budget_scoped(&query.category_id, query.scope, &query.month)
        .await
    {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn copy_budgets<C: Connection>(
    State(state): State<RestState<C>>,
    Path((month, source_month)): Path<(String, String)>,
) -> Response {
    info!("POST /api/v1/budgets/{}/copy-from/{}", month, source_month);

    match state.budgets.copy_budgets(&month, &source_month).await {
        Ok(budgets) => (StatusCode::OK, Json(budgets)).into_response(),
        Err(e) => error_response(e),
    }
}

#[cfg(test)]
mod tests {
    use super::super::create_router;
    use crate::backend::storage::memory::MemoryConnection;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn put_request(uri: &str, body: Value) -> Request<Body> {
        Request::put(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_upsert_then_list_carried_month() {
        let app = create_router(MemoryConnection::new(), None);
        let body = json!({ "month": "ignored", "categoryId": "ignored", "limit": 50000 });

        let response = app
            .clone()
            .oneshot(put_request("/api/v1/budgets/2026-03/cat-1", body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(Request::get("/api/v1/budgets?month=2026-05").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let budgets: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(budgets[0]["categoryId"], "cat-1");
        assert_eq!(budgets[0]["limit"], 50000);
        assert_eq!(budgets[0]["copiedFromMonth"], "2026-03");
    }

    #[tokio::test]
    async fn test_negative_limit_is_unprocessable() {
        let app = create_router(MemoryConnection::new(), None);
        let body = json!({ "month": "2026-03", "categoryId": "cat-1", "limit": -1 });

        let response = app
            .oneshot(put_request("/api/v1/budgets/2026-03/cat-1", body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_unknown_scope_is_bad_request() {
        let app = create_router(MemoryConnection::new(), None);
        let request = Request::delete("/api/v1/budgets/scope?scope=forever&categoryId=cat-1&month=2026-03")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
