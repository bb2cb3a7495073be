//! Review API endpoints.

use axum::{
    extract::{Path, Query, State},
    Json,
};

use super::{respond, respond_deleted, ApiResult, DeleteOutcome};
use crate::models::{CreateReviewRequest, Review, ReviewFilter, ReviewSummary, UpdateReviewRequest};
use crate::AppState;

/// GET /api/reviews?caravanId&verified&limit - List reviews.
pub async fn list_reviews(
    State(state): State<AppState>,
    Query(filter): Query<ReviewFilter>,
) -> ApiResult<Vec<Review>> {
    let result = state.store.list_reviews(&filter).await;
    respond(&state, result).await
}

/// GET /api/reviews/summary/{caravanId} - Count and average rating.
pub async fn review_summary(
    State(state): State<AppState>,
    Path(caravan_id): Path<String>,
) -> ApiResult<ReviewSummary> {
    let result = state.store.review_summary(&caravan_id).await;
    respond(&state, result).await
}

/// POST /api/reviews - Public review submission.
pub async fn create_review(
    State(state): State<AppState>,
    Json(request): Json<CreateReviewRequest>,
) -> ApiResult<Review> {
    let result = state.store.create_review(&request).await;
    respond(&state, result).await
}

/// PUT /api/admin/reviews/{id} - Edit or verify a review.
pub async fn update_review(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateReviewRequest>,
) -> ApiResult<Review> {
    let result = state.store.update_review(&id, &request).await;
    respond(&state, result).await
}

/// DELETE /api/admin/reviews/{id} - Delete a review.
pub async fn delete_review(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<DeleteOutcome> {
    let result = state.store.delete_review(&id).await;
    respond_deleted(&state, id, result).await
}
