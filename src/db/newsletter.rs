//! Newsletter subscriber operations.

use super::fallback::list_recent;
use super::store::DocumentStore;
use crate::errors::AppError;
use crate::models::{
    collections, to_object, typed_listing, SubscribeOutcome, SubscribeRequest, Subscriber,
};

const SORT_CHAIN: [&str; 1] = ["createdAt"];

impl DocumentStore {
    // ==================== NEWSLETTER OPERATIONS ====================

    /// Subscribe an email address. Subscribing twice returns the existing
    /// record and writes nothing.
    pub async fn subscribe(&self, request: &SubscribeRequest) -> Result<SubscribeOutcome, AppError> {
        let request = request.normalized()?;

        if let Some(existing) = self
            .find_one(
                collections::NEWSLETTER_SUBSCRIBERS,
                "email",
                request.email.as_str(),
            )
            .await?
        {
            tracing::debug!("{} already subscribed", request.email);
            return Ok(SubscribeOutcome {
                subscriber: existing.into_typed()?,
                already_subscribed: true,
            });
        }

        let document = self
            .create(collections::NEWSLETTER_SUBSCRIBERS, to_object(&request)?)
            .await?;
        Ok(SubscribeOutcome {
            subscriber: document.into_typed()?,
            already_subscribed: false,
        })
    }

    pub async fn list_subscribers(&self) -> Result<Vec<Subscriber>, AppError> {
        let documents = list_recent(
            self,
            collections::NEWSLETTER_SUBSCRIBERS,
            Vec::new(),
            &SORT_CHAIN,
            None,
        )
        .await?;
        Ok(typed_listing(documents))
    }

    pub async fn delete_subscriber(&self, id: &str) -> Result<bool, AppError> {
        self.delete(collections::NEWSLETTER_SUBSCRIBERS, id).await
    }
}
