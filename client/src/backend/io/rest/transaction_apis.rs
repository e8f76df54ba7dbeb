//! # REST API for Transactions
//!
//! Transactions are keyed by id and their current date, so updates and
//! deletes take the date as a query parameter.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, patch},
    Router,
};
use serde::Deserialize;
use shared::{TransactionListRequest, TransactionPayload};
use tracing::info;

use super::{error_response, RestState};
use crate::backend::storage::traits::{Connection, TransactionStorage};

#[derive(Debug, Deserialize)]
pub struct DateQuery {
    pub date: String,
}

pub fn router<C: Connection>() -> Router<RestState<C>> {
    Router::new()
        .route("/transactions", get(list_transactions::<C>).post(create_transaction::<C>))
        .route(
            "/transactions/:transaction_id",
            patch(update_transaction::<C>).delete(delete_transaction::<C>),
        )
}

/// List transactions inside an optional date window, newest first
pub async fn list_transactions<C: Connection>(
    State(state): State<RestState<C>>,
    Query(query): Query<TransactionListRequest>,
) -> Response {
    info!("GET /api/v1/transactions - query: {:?}", query);

    match state.transactions.list_transactions(&query).await {
        Ok(transactions) => (StatusCode::OK, Json(transactions)).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn create_transaction<C: Connection>(
    State(state): State<RestState<C>>,
    Json(payload): Json<TransactionPayload>,
) -> Response {
    info!("POST /api/v1/transactions - {} on {}", payload.amount, payload.date);

    match state.transactions.create_transaction(&payload).await {
        Ok(transaction) => (StatusCode::CREATED, Json(transaction)).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn update_transaction<C: Connection>(
    State(state): State<RestState<C>>,
    Path(transaction_id): Path<String>,
    Query(query): Query<DateQuery>,
    Json(payload): Json<TransactionPayload>,
) -> Response {
    info!("PATCH /api/v1/transactions/{}?date={}", transaction_id, query.date);

    match state
        .transactions
        .update_transaction(&transaction_id, &query.date, &payload)
        .await
    {
        Ok(transaction) => (StatusCode::OK, Json(transaction)).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn delete_transaction<C: Connection>(
    State(state): State<RestState<C>>,
    Path(transaction_id): Path<String>,
    Query(query): Query<DateQuery>,
) -> Response {
    info!("DELETE /api/v1/transactions/{}?date={}", transaction_id, query.date);

    match state
        .transactions
        .delete_transaction(&transaction_id, &query.date)
        .await
    {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
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

    #[tokio::test]
    async fn test_create_then_list_window() {
        let app = create_router(MemoryConnection::new(), None);
        for (date, amount) in [("2026-03-04", -1200), ("2026-04-01", -800)] {
            let request = Request::post("/api/v1/transactions")
                .header("content-type", "application/json")
                .body(Body::from(json!({ "date": date, "amount": amount }).to_string()))
                .unwrap();
            let response = app.clone().oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::CREATED);
        }

        let request = Request::get("/api/v1/transactions?date_from=2026-03-01&date_to=2026-03-31")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let listed: Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(listed.as_array().map(Vec::len), Some(1));
        assert_eq!(listed[0]["amount"], -1200);
    }

    #[tokio::test]
    async fn test_delete_requires_matching_date() {
        let app = create_router(MemoryConnection::new(), None);
        let request = Request::delete("/api/v1/transactions/missing?date=2026-03-04")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
