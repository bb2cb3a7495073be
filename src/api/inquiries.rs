//! Inquiry API endpoints for all six inquiry kinds.

use axum::{
    extract::{Path, Query, State},
    Json,
};

use super::{current_revision, error, respond, respond_deleted, respond_found, ApiResult, DeleteOutcome};
use crate::errors::AppError;
use crate::models::{
    Inquiry, InquiryFilter, InquiryKind, InquiryStats, StatusUpdateRequest, SubmitInquiryRequest,
};
use crate::AppState;

fn parse_kind(raw: &str) -> Result<InquiryKind, AppError> {
    InquiryKind::parse(raw)
        .ok_or_else(|| AppError::NotFound(format!("Unknown inquiry kind: {}", raw)))
}

/// POST /api/inquiries/{kind} - Submit a public form.
pub async fn submit_inquiry(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Json(request): Json<SubmitInquiryRequest>,
) -> ApiResult<Inquiry> {
    let kind = match parse_kind(&kind) {
        Ok(kind) => kind,
        Err(e) => return error(e, current_revision(&state).await),
    };

    let result = state.store.submit_inquiry(kind, &request).await;
    respond(&state, result).await
}

/// GET /api/admin/inquiries/{kind}?status&q - List inquiries of one kind.
pub async fn list_inquiries(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Query(filter): Query<InquiryFilter>,
) -> ApiResult<Vec<Inquiry>> {
    let result = match parse_kind(&kind) {
        Ok(kind) => state.store.list_inquiries(kind, &filter).await,
        Err(e) => Err(e),
    };
    respond(&state, result).await
}

/// GET /api/admin/inquiries/{kind}/stats - Counts per status.
pub async fn inquiry_stats(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> ApiResult<InquiryStats> {
    let result = match parse_kind(&kind) {
        Ok(kind) => state.store.inquiry_stats(kind).await,
        Err(e) => Err(e),
    };
    respond(&state, result).await
}

/// GET /api/admin/inquiries/{kind}/{id} - A single inquiry.
pub async fn get_inquiry(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, String)>,
) -> ApiResult<Inquiry> {
    let result = match parse_kind(&kind) {
        Ok(kind) => state.store.get_inquiry(kind, &id).await,
        Err(e) => Err(e),
    };
    respond_found(&state, result, &format!("Inquiry {}", id)).await
}

/// PUT /api/admin/inquiries/{kind}/{id}/status - Move an inquiry along its workflow.
pub async fn update_inquiry_status(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, String)>,
    Json(request): Json<StatusUpdateRequest>,
) -> ApiResult<Inquiry> {
    let result = match parse_kind(&kind) {
        Ok(kind) => {
            state
                .store
                .update_inquiry_status(kind, &id, &request.status)
                .await
        }
        Err(e) => Err(e),
    };
    respond(&state, result).await
}

/// DELETE /api/admin/inquiries/{kind}/{id} - Delete an inquiry.
pub async fn delete_inquiry(
    State(state): State<AppState>,
    Path((kind, id)): Path<(String, String)>,
) -> ApiResult<DeleteOutcome> {
    let result = match parse_kind(&kind) {
        Ok(kind) => state.store.delete_inquiry(kind, &id).await,
        Err(e) => Err(e),
    };
    respond_deleted(&state, id, result).await
}
