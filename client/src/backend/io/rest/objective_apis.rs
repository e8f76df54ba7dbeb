//! # REST API for Objectives

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, patch, post},
    Router,
};
use serde::Deserialize;
use shared::{CreateObjectivePayload, UpdateObjectivePayload};
use tracing::info;

use super::{error_response, RestState};
use crate::backend::storage::traits::{Connection, ObjectiveStorage};

#[derive(Debug, Default, Deserialize)]
pub struct ForceQuery {
    #[serde(default)]
    pub force: bool,
}

pub fn router<C: Connection>() -> Router<RestState<C>> {
    Router::new()
        .route("/objectives", get(list_objectives::<C>).post(create_objective::<C>))
        .route(
            "/objectives/:objective_id",
            patch(update_objective::<C>).delete(delete_objective::<C>),
        )
        .route("/objectives/:objective_id/complete", post(complete_objective::<C>))
}

pub async fn list_objectives<C: Connection>(State(state): State<RestState<C>>) -> Response {
    info!("GET /api/v1/objectives");

    match state.objectives.list_objectives().await {
        Ok(objectives) => (StatusCode::OK, Json(objectives)).into_response(),
        Err(e) => error_response(e),
    }
}

/// Create an objective and its budget rows; 409 on occupied slots unless `force`
pub async fn create_objective<C: Connection>(
    State(state): State<RestState<C>>,
    Query(query): Query<ForceQuery>,
    Json(payload): Json<CreateObjectivePayload>,
) -> Response {
    info!("POST /api/v1/objectives - '{}' force={}", payload.name, query.force);

    match state.objectives.create_objective(&payload, query.force).await {
        Ok(objective) => (StatusCode::CREATED, Json(objective)).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn update_objective<C: Connection>(
    State(state): State<RestState<C>>,
    Path(objective_id): Path<String>,
    Query(query): Query<ForceQuery>,
    Json(payload): Json<UpdateObjectivePayload>,
) -> Response {
    info!("PATCH /api/v1/objectives/{} force={}", objective_id, query.force);

    match state
        .objectives
        .update_objective(&objective_id, &payload, query.force)
        .await
    {
        Ok(objective) => (StatusCode::OK, Json(objective)).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn complete_objective<C: Connection>(
    State(state): State<RestState<C>>,
    Path(objective_id): Path<String>,
) -> Response {
    info!("POST /api/v1/objectives/{}/complete", objective_id);

    match state.objectives.complete_objective(&objective_id).await {
        Ok(objective) => (StatusCode::OK, Json(objective)).into_response(),
        Err(e) => error_response(e),
    }
}

/// Archive the objective; its budget rows go with it
pub async fn delete_objective<C: Connection>(
    State(state): State<RestState<C>>,
    Path(objective_id): Path<String>,
) -> Response {
    info!("DELETE /api/v1/objectives/{}", objective_id);

    match state.objectives.delete_objective(&objective_id).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => error_response(e),
    }
}
