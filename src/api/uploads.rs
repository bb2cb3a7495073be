//! Media upload endpoint.

use axum::extract::{Multipart, State};

use super::{respond, ApiResult};
use crate::errors::AppError;
use crate::media::UploadedMedia;
use crate::AppState;

/// Multipart field carrying the file.
pub const UPLOAD_FIELD: &str = "file";

/// POST /api/admin/uploads - Store one file and return its public URL.
pub async fn upload_media(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ApiResult<UploadedMedia> {
    let result = save_upload(&state, multipart).await;
    respond(&state, result).await
}

async fn save_upload(state: &AppState, mut multipart: Multipart) -> Result<UploadedMedia, AppError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await?;

        return state
            .media
            .save(&file_name, content_type.as_deref(), &bytes)
            .await;
    }

    Err(AppError::Validation(format!(
        "Missing multipart field '{}'",
        UPLOAD_FIELD
    )))
}
