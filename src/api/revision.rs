//! Revision endpoint.

use axum::extract::State;

use super::{respond, ApiResult};
use crate::models::RevisionInfo;
use crate::AppState;

/// GET /api/revision - Current revision, for cheap change checks.
pub async fn get_revision(State(state): State<AppState>) -> ApiResult<RevisionInfo> {
    let result = state
        .store
        .get_revision_info(&state.config.project_id)
        .await;
    respond(&state, result).await
}
