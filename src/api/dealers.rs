//! Dealer locator API endpoints.

use axum::{
    extract::{Path, Query, State},
    Json,
};

use super::{respond, respond_deleted, respond_found, ApiResult, DeleteOutcome};
use crate::models::{
    CreateDealerRequest, Dealer, DealerFilter, NearbyDealer, NearestQuery, UpdateDealerRequest,
};
use crate::AppState;

/// GET /api/dealers?state - List dealers.
pub async fn list_dealers(
    State(state): State<AppState>,
    Query(filter): Query<DealerFilter>,
) -> ApiResult<Vec<Dealer>> {
    let result = state.store.list_dealers(&filter).await;
    respond(&state, result).await
}

/// GET /api/dealers/nearest?lat&lng&limit - Closest dealers to a point.
pub async fn nearest_dealers(
    State(state): State<AppState>,
    Query(query): Query<NearestQuery>,
) -> ApiResult<Vec<NearbyDealer>> {
    let result = state.store.nearest_dealers(&query).await;
    respond(&state, result).await
}

/// GET /api/dealers/{id} - A single dealer.
pub async fn get_dealer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Dealer> {
    let result = state.store.get_dealer(&id).await;
    respond_found(&state, result, &format!("Dealer {}", id)).await
}

/// POST /api/admin/dealers - Create a dealer.
pub async fn create_dealer(
    State(state): State<AppState>,
    Json(request): Json<CreateDealerRequest>,
) -> ApiResult<Dealer> {
    let result = state.store.create_dealer(&request).await;
    respond(&state, result).await
}

/// PUT /api/admin/dealers/{id} - Update a dealer.
pub async fn update_dealer(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateDealerRequest>,
) -> ApiResult<Dealer> {
    let result = state.store.update_dealer(&id, &request).await;
    respond(&state, result).await
}

/// DELETE /api/admin/dealers/{id} - Delete a dealer.
pub async fn delete_dealer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<DeleteOutcome> {
    let result = state.store.delete_dealer(&id).await;
    respond_deleted(&state, id, result).await
}
