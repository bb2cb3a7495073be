//! Review operations.

use serde_json::Value;

use super::fallback::list_recent;
use super::store::{DocumentStore, Filter};
use crate::errors::AppError;
use crate::models::{
    collections, to_object, typed_listing, CreateReviewRequest, Review, ReviewFilter, ReviewSummary,
    UpdateReviewRequest,
};

/// Reviews carry a user-entered `date`; `createdAt` is the indexed fallback.
const SORT_CHAIN: [&str; 2] = ["date", "createdAt"];

impl DocumentStore {
    // ==================== REVIEW OPERATIONS ====================

    /// List reviews, newest first.
    pub async fn list_reviews(&self, filter: &ReviewFilter) -> Result<Vec<Review>, AppError> {
        let mut filters = Vec::new();
        if let Some(caravan_id) = filter.caravan_id.as_deref() {
            filters.push(Filter {
                field: "caravanId".to_string(),
                value: Value::String(caravan_id.to_string()),
            });
        }
        if let Some(verified) = filter.verified {
            filters.push(Filter {
                field: "verified".to_string(),
                value: Value::Bool(verified),
            });
        }

        let documents =
            list_recent(self, collections::REVIEWS, filters, &SORT_CHAIN, filter.limit).await?;
        Ok(typed_listing(documents))
    }

    pub async fn get_review(&self, id: &str) -> Result<Option<Review>, AppError> {
        self.get(collections::REVIEWS, id)
            .await?
            .map(|d| d.into_typed())
            .transpose()
    }

    /// Review count and average rating for one caravan.
    pub async fn review_summary(&self, caravan_id: &str) -> Result<ReviewSummary, AppError> {
        let reviews = self
            .list_reviews(&ReviewFilter {
                caravan_id: Some(caravan_id.to_string()),
                ..Default::default()
            })
            .await?;
        Ok(ReviewSummary::from_reviews(caravan_id, &reviews))
    }

    /// Store a submitted review. New reviews are never verified.
    pub async fn create_review(&self, request: &CreateReviewRequest) -> Result<Review, AppError> {
        request.validate()?;

        let mut data = to_object(request)?;
        data.insert("verified".to_string(), Value::Bool(false));

        self.create(collections::REVIEWS, data).await?.into_typed()
    }

    pub async fn update_review(
        &self,
        id: &str,
        request: &UpdateReviewRequest,
    ) -> Result<Review, AppError> {
        request.validate()?;
        self.update(collections::REVIEWS, id, to_object(request)?)
            .await?
            .into_typed()
    }

    pub async fn delete_review(&self, id: &str) -> Result<bool, AppError> {
        self.delete(collections::REVIEWS, id).await
    }
}
