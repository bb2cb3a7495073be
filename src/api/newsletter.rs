//! Newsletter API endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{respond, respond_deleted, ApiResult, DeleteOutcome};
use crate::models::{SubscribeOutcome, SubscribeRequest, Subscriber};
use crate::AppState;

/// POST /api/newsletter - Subscribe an email address.
pub async fn subscribe(
    State(state): State<AppState>,
    Json(request): Json<SubscribeRequest>,
) -> ApiResult<SubscribeOutcome> {
    let result = state.store.subscribe(&request).await;
    respond(&state, result).await
}

/// GET /api/admin/newsletter - List subscribers.
pub async fn list_subscribers(State(state): State<AppState>) -> ApiResult<Vec<Subscriber>> {
    let result = state.store.list_subscribers().await;
    respond(&state, result).await
}

/// DELETE /api/admin/newsletter/{id} - Remove a subscriber.
pub async fn delete_subscriber(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<DeleteOutcome> {
    let result = state.store.delete_subscriber(&id).await;
    respond_deleted(&state, id, result).await
}
