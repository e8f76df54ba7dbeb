//! # REST API for Categories

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, patch},
    Router,
};
use shared::CategoryPayload;
use tracing::info;

use super::{error_response, RestState};
use crate::backend::storage::traits::{CategoryStorage, Connection};

pub fn router<C: Connection>() -> Router<RestState<C>> {
    Router::new()
        .route("/categories", get(list_categories::<C>).post(create_category::<C>))
        .route(
            "/categories/:category_id",
            patch(update_category::<C>).delete(delete_category::<C>),
        )
}

pub async fn list_categories<C: Connection>(State(state): State<RestState<C>>) -> Response {
    info!("GET /api/v1/categories");

    match state.categories.list_categories().await {
        Ok(categories) => (StatusCode::OK, Json(categories)).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn create_category<C: Connection>(
    State(state): State<RestState<C>>,
    Json(payload): Json<CategoryPayload>,
) -> Response {
    info!("POST /api/v1/categories - {:?}", payload.name);

    match state.categories.create_category(&payload).await {
        Ok(category) => (StatusCode::CREATED, Json(category)).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn update_category<C: Connection>(
    State(state): State<RestState<C>>,
    Path(category_id): Path<String>,
    Json(payload): Json<CategoryPayload>,
) -> Response {
    info!("PATCH /api/v1/categories/{}", category_id);

    match state.categories.update_category(&category_id, &payload).await {
        Ok(category) => (StatusCode::OK, Json(category)).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn delete_category<C: Connection>(
    State(state): State<RestState<C>>,
    Path(category_id): Path<String>,
) -> Response {
    info!("DELETE /api/v1/categories/{}", category_id);

    match state.categories.delete_category(&category_id).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(e) => error_response(e),
    }
}
