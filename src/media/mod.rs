//! Media uploads stored on the local filesystem and served under `/media`.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::errors::AppError;

/// Accepted extensions and the content type served for each.
pub const ALLOWED_TYPES: &[(&str, &str)] = &[
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("webp", "image/webp"),
    ("gif", "image/gif"),
    ("avif", "image/avif"),
    ("svg", "image/svg+xml"),
    ("pdf", "application/pdf"),
];

/// URL path prefix the media directory is mounted at.
pub const MEDIA_ROUTE: &str = "/media";

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UploadedMedia {
    pub url: String,
    pub file_name: String,
    pub content_type: String,
    pub size: usize,
}

/// Directory of uploaded files plus the public URL they are reachable at.
#[derive(Debug, Clone)]
pub struct MediaStore {
    dir: PathBuf,
    public_base_url: String,
}

impl MediaStore {
    /// Open the media directory, creating it if needed.
    pub async fn open(dir: &Path, public_base_url: &str) -> Result<Self, AppError> {
        tokio::fs::create_dir_all(dir).await?;
        Ok(Self {
            dir: dir.to_path_buf(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write an upload under a generated name that keeps its extension.
    pub async fn save(
        &self,
        original_name: &str,
        content_type: Option<&str>,
        bytes: &[u8],
    ) -> Result<UploadedMedia, AppError> {
        if bytes.is_empty() {
            return Err(AppError::Validation("Uploaded file is empty".to_string()));
        }

        let extension = extension_of(original_name).ok_or_else(|| {
            AppError::Validation(format!(
                "File type not allowed; expected one of: {}",
                allowed_extensions().join(", ")
            ))
        })?;
        let default_type = content_type_for(&extension).unwrap_or("application/octet-stream");

        let file_name = format!("{}.{}", uuid::Uuid::new_v4(), extension);
        tokio::fs::write(self.dir.join(&file_name), bytes).await?;

        tracing::info!("Stored upload {} as {} ({} bytes)", original_name, file_name, bytes.len());

        Ok(UploadedMedia {
            url: format!("{}{}/{}", self.public_base_url, MEDIA_ROUTE, file_name),
            file_name,
            content_type: content_type
                .filter(|t| !t.trim().is_empty())
                .unwrap_or(default_type)
                .to_string(),
            size: bytes.len(),
        })
    }
}

/// Lowercased extension if it is on the allow list.
pub fn extension_of(file_name: &str) -> Option<String> {
    let extension = Path::new(file_name)
        .extension()?
        .to_str()?
        .to_ascii_lowercase();
    content_type_for(&extension).map(|_| extension)
}

pub fn content_type_for(extension: &str) -> Option<&'static str> {
    ALLOWED_TYPES
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, content_type)| *content_type)
}

fn allowed_extensions() -> Vec<&'static str> {
    ALLOWED_TYPES.iter().map(|(ext, _)| *ext).collect()
}
