//! REST API module.
//!
//! Handlers for the public site and the admin panel. Every JSON response is
//! wrapped in the `{success, data, revisionId}` envelope.

mod bookings;
mod caravans;
mod dealers;
mod events;
mod inquiries;
mod newsletter;
mod posts;
mod reviews;
mod revision;
mod uploads;

pub use bookings::*;
pub use caravans::*;
pub use dealers::*;
pub use events::*;
pub use inquiries::*;
pub use newsletter::*;
pub use posts::*;
pub use reviews::*;
pub use revision::*;
pub use uploads::*;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::errors::AppError;
use crate::AppState;

/// Success response envelope.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
    pub revision_id: i64,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T, revision_id: i64) -> Self {
        Self {
            success: true,
            data,
            revision_id,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Response type that can be either success or error.
pub type ApiResult<T> = Result<ApiResponse<T>, crate::errors::AppErrorWithRevision>;

/// Create a successful API response.
pub fn success<T: Serialize>(data: T, revision_id: i64) -> ApiResult<T> {
    Ok(ApiResponse::new(data, revision_id))
}

/// Create an error API response.
pub fn error<T: Serialize>(err: AppError, revision_id: i64) -> ApiResult<T> {
    Err(crate::errors::AppErrorWithRevision {
        error: err,
        revision_id,
    })
}

/// Result of a delete. Deleting something already gone still succeeds.
#[derive(Debug, Serialize)]
pub struct DeleteOutcome {
    pub id: String,
    pub deleted: bool,
}

/// Current revision, or 0 when the meta row cannot be read.
async fn current_revision(state: &AppState) -> i64 {
    match state.store.get_revision_id().await {
        Ok(revision_id) => revision_id,
        Err(e) => {
            tracing::warn!("Failed to read revision: {}", e);
            0
        }
    }
}

/// Envelope a store result, stamped with the revision after the call.
async fn respond<T: Serialize>(state: &AppState, result: Result<T, AppError>) -> ApiResult<T> {
    let revision_id = current_revision(state).await;
    match result {
        Ok(data) => success(data, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// Like `respond`, but a missing record becomes a 404.
async fn respond_found<T: Serialize>(
    state: &AppState,
    result: Result<Option<T>, AppError>,
    what: &str,
) -> ApiResult<T> {
    let result = result.and_then(|found| {
        found.ok_or_else(|| AppError::NotFound(format!("{} not found", what)))
    });
    respond(state, result).await
}

async fn respond_deleted(
    state: &AppState,
    id: String,
    result: Result<bool, AppError>,
) -> ApiResult<DeleteOutcome> {
    let result = result.map(|deleted| DeleteOutcome { id, deleted });
    respond(state, result).await
}
