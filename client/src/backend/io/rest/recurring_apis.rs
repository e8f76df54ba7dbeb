//! # REST API for Recurring Rules and Bills

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, patch, post},
    Router,
};
use serde::Deserialize;
use shared::{BillUpdatePayload, RecurringPayload};
use tracing::info;

use super::{error_response, RestState};
use crate::backend::storage::traits::{Connection, RecurringStorage};

#[derive(Debug, Deserialize)]
pub struct BillsQuery {
    pub date_from: String,
    pub date_to: String,
}

pub fn router<C: Connection>() -> Router<RestState<C>> {
    Router::new()
        .route("/recurring", get(list_recurring::<C>).post(create_recurring::<C>))
        .route("/recurring/:rule_id", patch(update_recurring::<C>))
        .route("/recurring/:rule_id/pause", post(pause_recurring::<C>))
        .route("/recurring/:rule_id/resume", post(resume_recurring::<C>))
        .route("/recurring/:rule_id/stop", post(stop_recurring::<C>))
        .route("/bills", get(list_bills::<C>))
        .route("/bills/:bill_id", patch(update_bill::<C>))
}

pub async fn list_recurring<C: Connection>(State(state): State<RestState<C>>) -> Response {
    info!("GET /api/v1/recurring");

    match state.recurring.list_recurring().await {
        Ok(rules) => (StatusCode::OK, Json(rules)).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn create_recurring<C: Connection>(
    State(state): State<RestState<C>>,
    Json(payload): Json<RecurringPayload>,
) -> Response {
    info!("POST /api/v1/recurring - {}", payload.name);

    match state.recurring.create_recurring(&payload).await {
        Ok(rule) => (StatusCode::OK, Json(rule)).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn update_recurring<C: Connection>(
    State(state): State<RestState<C>>,
    Path(rule_id): Path<String>,
    Json(payload): Json<RecurringPayload>,
) -> Response {
    info!("PATCH /api/v1/recurring/{}", rule_id);

    match state.recurring.update_recurring(&rule_id, &payload).await {
        Ok(rule) => (StatusCode::OK, Json(rule)).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn pause_recurring<C: Connection>(
    State(state): State<RestState<C>>,
    Path(rule_id): Path<String>,
) -> Response {
    info!("POST /api/v1/recurring/{}/pause", rule_id);

    match state.recurring.pause_recurring(&rule_id).await {
        Ok(toggle) => (StatusCode::OK, Json(toggle)).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn resume_recurring<C: Connection>(
    State(state): State<RestState<C>>,
    Path(rule_id): Path<String>,
) -> Response {
    info!("POST /api/v1/recurring/{}/resume", rule_id);

    match state.recurring.resume_recurring(&rule_id).await {
        Ok(toggle) => (StatusCode::OK, Json(toggle)).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn stop_recurring<C: Connection>(
    State(state): State<RestState<C>>,
    Path(rule_id): Path<String>,
) -> Response {
    info!("POST /api/v1/recurring/{}/stop", rule_id);

    match state.recurring.stop_recurring(&rule_id).await {
        Ok(toggle) => (StatusCode::OK, Json(toggle)).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn list_bills<C: Connection>(
    State(state): State<RestState<C>>,
    Query(query): Query<BillsQuery>,
) -> Response {
    info!("GET /api/v1/bills - {} to {}", query.date_from, query.date_to);

    match state.recurring.list_bills(&query.date_from, &query.date_to).await {
        Ok(bills) => (StatusCode::OK, Json(bills)).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn update_bill<C: Connection>(
    State(state): State<RestState<C>>,
    Path(bill_id): Path<String>,
    Json(payload): Json<BillUpdatePayload>,
) -> Response {
    info!("PATCH /api/v1/bills/{} - {:?}", bill_id, payload.status);

    match state.recurring.update_bill(&bill_id, &payload).await {
        Ok(bill) => (StatusCode::OK, Json(bill)).into_response(),
        Err(e) => error_response(e),
    }
}
