//! # REST API Interface Layer
//!
//! Stub HTTP server speaking the Ledger REST contract over any
//! [`Connection`]. It exists so the reqwest store can be exercised end to end
//! and so the client can be pointed at a local server with demo data.
//!
//! ## Key Responsibilities
//!
//! - **API Endpoints**: budgets, objectives, categories, transactions, bills
//! - **Authentication**: optional bearer token checked on every route
//! - **Error Handling**: [`LedgerError`] answered as `{"detail": ...}` with
//!   the matching status; conflicts carry the conflicting slots
//!
//! All routes live under `/api/v1`. Business rules (carry-forward, conflicts,
//! archiving) belong to the store behind the connection, not to the handlers.

pub mod budget_apis;
pub mod category_apis;
pub mod mappers;
pub mod objective_apis;
pub mod recurring_apis;
pub mod transaction_apis;

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Json, Response},
    Router,
};
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::backend::domain::error::LedgerError;
use crate::backend::storage::traits::Connection;

/// Repositories shared by every handler
#[derive(Clone)]
pub struct RestState<C: Connection> {
    pub budgets: C::BudgetRepository,
    pub objectives: C::ObjectiveRepository,
    pub categories: C::CategoryRepository,
    pub transactions: C::TransactionRepository,
    pub recurring: C::RecurringRepository,
}

impl<C: Connection> RestState<C> {
    pub fn new(connection: &C) -> Self {
        Self {
            budgets: connection.create_budget_repository(),
            objectives: connection.create_objective_repository(),
            categories: connection.create_category_repository(),
            transactions: connection.create_transaction_repository(),
            recurring: connection.create_recurring_repository(),
        }
    }
}

/// Answer a failed store call
pub fn error_response(error: LedgerError) -> Response {
    let status = StatusCode::from_u16(error.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let detail = match error {
        LedgerError::Conflict { message, conflicts } => json!({ "message": message, "conflicts": conflicts }),
        LedgerError::Validation(message) | LedgerError::NotFound(message) => json!(message),
        other => json!(other.to_string()),
    };
    if status.is_server_error() {
        warn!("Answering {} with {}", status, detail);
    }
    (status, Json(json!({ "detail": detail }))).into_response()
}

async fn require_token(State(token): State<Option<String>>, request: Request, next: Next) -> Response {
    let Some(expected) = token else {
        return next.run(request).await;
    };

    let presented = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));
    if presented == Some(expected.as_str()) {
        next.run(request).await
    } else {
        warn!("Rejected {} {}: bad or missing token", request.method(), request.uri());
        error_response(LedgerError::Unauthorized)
    }
}

/// Create the Axum router with all routes configured
pub fn create_router<C: Connection>(connection: C, token: Option<String>) -> Router {
    let api_routes = Router::new()
        .merge(budget_apis::router::<C>())
        .merge(objective_apis::router::<C>())
        .merge(category_apis::router::<C>())
        .merge(transaction_apis::router::<C>())
        .merge(recurring_apis::router::<C>())
        .route_layer(middleware::from_fn_with_state(token, require_token))
        .with_state(RestState::new(&connection));

    Router::new()
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Serve the stub API on `listener` until the task is dropped
pub async fn serve<C: Connection>(listener: TcpListener, connection: C, token: Option<String>) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!("Ledger stub API listening on http://{}/api/v1", addr);
    }
    axum::serve(listener, create_router(connection, token)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::storage::memory::MemoryConnection;
    use axum::body::{to_bytes, Body};
    use axum::http::Request as HttpRequest;
    use tower::ServiceExt;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_missing_token_is_rejected() {
        let app = create_router(MemoryConnection::new(), Some("secret".to_string()));
        let request = HttpRequest::get("/api/v1/categories").body(Body::empty()).unwrap();

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["detail"], "Unauthorized");
    }

    #[tokio::test]
    async fn test_valid_token_reaches_handler() {
        let app = create_router(MemoryConnection::new(), Some("secret".to_string()));
        let request = HttpRequest::get("/api/v1/categories")
            .header(header::AUTHORIZATION, "Bearer secret")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!([]));
    }

    #[tokio::test]
    async fn test_conflict_body_lists_slots() {
        let response = error_response(LedgerError::Conflict {
            message: "Budget conflicts".to_string(),
            conflicts: vec![shared::BudgetConflict {
                month: "2026-01".to_string(),
                category_id: "cat-1".to_string(),
                objective_id: None,
            }],
        });

        assert_eq!(response.status(), StatusCode::CONFLICT);
        let body = body_json(response).await;
        assert_eq!(body["detail"]["message"], "Budget conflicts");
        assert_eq!(body["detail"]["conflicts"][0]["categoryId"], "cat-1");
    }
}
