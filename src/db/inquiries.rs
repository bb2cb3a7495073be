//! Inquiry workflow operations, shared by all six inquiry kinds.

use serde_json::{Map, Value};

use super::fallback::list_recent;
use super::store::{DocumentStore, Filter};
use crate::errors::AppError;
use crate::models::{
    to_object, typed_listing, Inquiry, InquiryFilter, InquiryKind, InquiryStats,
    SubmitInquiryRequest,
};

const SORT_CHAIN: [&str; 1] = ["createdAt"];

impl DocumentStore {
    // ==================== INQUIRY OPERATIONS ====================

    /// Store a public form submission with the kind's initial status.
    pub async fn submit_inquiry(
        &self,
        kind: InquiryKind,
        request: &SubmitInquiryRequest,
    ) -> Result<Inquiry, AppError> {
        request.validate(kind)?;

        let mut data = to_object(request)?;
        data.insert("kind".to_string(), Value::String(kind.as_str().to_string()));
        data.insert(
            "status".to_string(),
            Value::String(kind.initial_status().as_str().to_string()),
        );

        let document = self.create(kind.collection(), data).await?;
        tracing::info!("New {} inquiry {}", kind.as_str(), document.id);
        document.into_typed()
    }

    /// List inquiries of one kind, newest first, optionally narrowed by
    /// status and free-text search.
    pub async fn list_inquiries(
        &self,
        kind: InquiryKind,
        filter: &InquiryFilter,
    ) -> Result<Vec<Inquiry>, AppError> {
        let mut filters = Vec::new();
        if let Some(raw) = filter.status.as_deref().filter(|s| !s.trim().is_empty()) {
            let status = kind.parse_status(raw)?;
            filters.push(Filter {
                field: "status".to_string(),
                value: Value::String(status.as_str().to_string()),
            });
        }

        let documents = list_recent(self, kind.collection(), filters, &SORT_CHAIN, None).await?;
        let inquiries: Vec<Inquiry> = typed_listing(documents);

        Ok(match filter.q.as_deref() {
            Some(needle) => inquiries
                .into_iter()
                .filter(|i| i.matches_search(needle))
                .collect(),
            None => inquiries,
        })
    }

    pub async fn get_inquiry(&self, kind: InquiryKind, id: &str) -> Result<Option<Inquiry>, AppError> {
        self.get(kind.collection(), id)
            .await?
            .map(|d| d.into_typed())
            .transpose()
    }

    /// Move an inquiry to another status of its kind. Setting the status it
    /// already has writes nothing.
    pub async fn update_inquiry_status(
        &self,
        kind: InquiryKind,
        id: &str,
        raw: &str,
    ) -> Result<Inquiry, AppError> {
        let status = kind.parse_status(raw)?;

        let current = self
            .get_inquiry(kind, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Inquiry {} not found", id)))?;
        if current.status == status {
            return Ok(current);
        }

        let mut changes = Map::new();
        changes.insert(
            "status".to_string(),
            Value::String(status.as_str().to_string()),
        );

        let updated: Inquiry = self
            .update(kind.collection(), id, changes)
            .await?
            .into_typed()?;
        tracing::info!(
            "{} inquiry {} moved from {} to {}",
            kind.as_str(),
            id,
            current.status.as_str(),
            updated.status.as_str()
        );
        Ok(updated)
    }

    pub async fn delete_inquiry(&self, kind: InquiryKind, id: &str) -> Result<bool, AppError> {
        self.delete(kind.collection(), id).await
    }

    /// Per-status counts for the admin dashboard.
    pub async fn inquiry_stats(&self, kind: InquiryKind) -> Result<InquiryStats, AppError> {
        let inquiries = self
            .list_inquiries(kind, &InquiryFilter::default())
            .await?;
        Ok(InquiryStats::tally(kind, &inquiries))
    }
}
