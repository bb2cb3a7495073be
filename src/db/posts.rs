//! Blog post and article operations.

use serde_json::Value;

use super::fallback::list_recent;
use super::store::{now_timestamp, DocumentStore, Filter};
use crate::errors::AppError;
use crate::models::timestamp::RECENCY_FIELDS;
use crate::models::{
    slug_candidate, slugify, to_object, typed_listing, CreatePostRequest, Post, PostFeed,
    UpdatePostRequest,
};

/// Upper bound on `-N` suffixes tried before giving up on a slug.
const MAX_SLUG_ATTEMPTS: usize = 1000;

impl DocumentStore {
    // ==================== POST OPERATIONS ====================

    /// All posts of a feed, newest first.
    pub async fn list_posts(&self, feed: PostFeed) -> Result<Vec<Post>, AppError> {
        let documents =
            list_recent(self, feed.collection(), Vec::new(), &RECENCY_FIELDS, None).await?;
        Ok(typed_listing(documents))
    }

    /// Posts flagged as popular, newest first.
    pub async fn list_popular_posts(
        &self,
        feed: PostFeed,
        limit: Option<usize>,
    ) -> Result<Vec<Post>, AppError> {
        let filters = vec![Filter {
            field: "popular".to_string(),
            value: Value::Bool(true),
        }];
        let documents = list_recent(self, feed.collection(), filters, &RECENCY_FIELDS, limit).await?;
        Ok(typed_listing(documents))
    }

    pub async fn get_post(&self, feed: PostFeed, id: &str) -> Result<Option<Post>, AppError> {
        self.get(feed.collection(), id)
            .await?
            .map(|d| d.into_typed())
            .transpose()
    }

    /// Look a post up by its URL slug.
    pub async fn get_post_by_slug(
        &self,
        feed: PostFeed,
        slug: &str,
    ) -> Result<Option<Post>, AppError> {
        self.find_one(feed.collection(), "slug", slug)
            .await?
            .map(|d| d.into_typed())
            .transpose()
    }

    /// Create a post with a unique slug derived from the request.
    pub async fn create_post(
        &self,
        feed: PostFeed,
        request: &CreatePostRequest,
    ) -> Result<Post, AppError> {
        request.validate()?;

        let slug = self
            .unique_slug(feed, &request.base_slug(), None)
            .await?;

        let mut data = to_object(request)?;
        data.insert("slug".to_string(), Value::String(slug));
        data.insert("lastUpdated".to_string(), Value::String(now_timestamp()));

        let document = self.create(feed.collection(), data).await?;
        tracing::info!("{} created: {}", feed.label(), document.id);
        document.into_typed()
    }

    /// Update a post. The slug only changes when a new one is supplied.
    pub async fn update_post(
        &self,
        feed: PostFeed,
        id: &str,
        request: &UpdatePostRequest,
    ) -> Result<Post, AppError> {
        request.validate()?;

        let mut changes = to_object(request)?;
        if let Some(requested) = request.slug.as_deref() {
            let slug = self.unique_slug(feed, &slugify(requested), Some(id)).await?;
            changes.insert("slug".to_string(), Value::String(slug));
        }
        changes.insert("lastUpdated".to_string(), Value::String(now_timestamp()));

        self.update(feed.collection(), id, changes)
            .await?
            .into_typed()
    }

    pub async fn delete_post(&self, feed: PostFeed, id: &str) -> Result<bool, AppError> {
        self.delete(feed.collection(), id).await
    }

    /// First of `base`, `base-2`, `base-3`, ... not used by another post.
    async fn unique_slug(
        &self,
        feed: PostFeed,
        base: &str,
        current_id: Option<&str>,
    ) -> Result<String, AppError> {
        for attempt in 1..=MAX_SLUG_ATTEMPTS {
            let candidate = slug_candidate(base, attempt);
            match self.find_one(feed.collection(), "slug", candidate.as_str()).await? {
                None => return Ok(candidate),
                Some(existing) if Some(existing.id.as_str()) == current_id => {
                    return Ok(candidate)
                }
                Some(_) => continue,
            }
        }
        Err(AppError::Validation(format!(
            "Could not find a free slug for {}",
            base
        )))
    }
}
