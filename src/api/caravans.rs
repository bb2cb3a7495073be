//! Caravan API endpoints.

use axum::{
    extract::{Path, Query, State},
    Json,
};

use super::{respond, respond_deleted, respond_found, ApiResult, DeleteOutcome};
use crate::models::{Caravan, CaravanFilter, CreateCaravanRequest, UpdateCaravanRequest};
use crate::AppState;

/// GET /api/caravans - List caravans.
pub async fn list_caravans(
    State(state): State<AppState>,
    Query(filter): Query<CaravanFilter>,
) -> ApiResult<Vec<Caravan>> {
    let result = state.store.list_caravans(&filter).await;
    respond(&state, result).await
}

/// GET /api/caravans/{id} - Get a single caravan.
pub async fn get_caravan(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Caravan> {
    let result = state.store.get_caravan(&id).await;
    respond_found(&state, result, &format!("Caravan {}", id)).await
}

/// POST /api/admin/caravans - Create a caravan.
pub async fn create_caravan(
    State(state): State<AppState>,
    Json(request): Json<CreateCaravanRequest>,
) -> ApiResult<Caravan> {
    let result = state.store.create_caravan(&request).await;
    respond(&state, result).await
}

/// PUT /api/admin/caravans/{id} - Update a caravan.
pub async fn update_caravan(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateCaravanRequest>,
) -> ApiResult<Caravan> {
    let result = state.store.update_caravan(&id, &request).await;
    respond(&state, result).await
}

/// DELETE /api/admin/caravans/{id} - Delete a caravan.
pub async fn delete_caravan(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<DeleteOutcome> {
    let result = state.store.delete_caravan(&id).await;
    respond_deleted(&state, id, result).await
}
