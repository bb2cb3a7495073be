//! Booking API endpoints.

use axum::{
    extract::{Path, Query, State},
    Json,
};

use super::{respond, respond_deleted, ApiResult, DeleteOutcome};
use crate::models::{Booking, BookingFilter, CreateBookingRequest, StatusUpdateRequest};
use crate::AppState;

/// POST /api/bookings - Request a viewing or test tow.
pub async fn create_booking(
    State(state): State<AppState>,
    Json(request): Json<CreateBookingRequest>,
) -> ApiResult<Booking> {
    let result = state.store.create_booking(&request).await;
    respond(&state, result).await
}

/// GET /api/admin/bookings?caravanId&status - List bookings.
pub async fn list_bookings(
    State(state): State<AppState>,
    Query(filter): Query<BookingFilter>,
) -> ApiResult<Vec<Booking>> {
    let result = state.store.list_bookings(&filter).await;
    respond(&state, result).await
}

/// PUT /api/admin/bookings/{id}/status - Change a booking's status.
pub async fn update_booking_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<StatusUpdateRequest>,
) -> ApiResult<Booking> {
    let result = state.store.update_booking_status(&id, &request.status).await;
    respond(&state, result).await
}

/// DELETE /api/admin/bookings/{id} - Delete a booking.
pub async fn delete_booking(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<DeleteOutcome> {
    let result = state.store.delete_booking(&id).await;
    respond_deleted(&state, id, result).await
}
