//! Caravan model operations.

use serde_json::Value;

use super::fallback::list_recent;
use super::store::{DocumentStore, Filter, OrderBy, Query};
use crate::errors::AppError;
use crate::models::{
    collections, to_object, typed_listing, Caravan, CaravanFilter, CaravanSort,
    CreateCaravanRequest, Document, UpdateCaravanRequest,
};

const SORT_CHAIN: [&str; 1] = ["createdAt"];

impl DocumentStore {
    // ==================== CARAVAN OPERATIONS ====================

    /// List caravans, newest first, with the derived price range filled in.
    pub async fn list_caravans(&self, filter: &CaravanFilter) -> Result<Vec<Caravan>, AppError> {
        let mut filters = Vec::new();
        if let Some(series) = filter.series.as_deref().filter(|s| !s.trim().is_empty()) {
            filters.push(Filter {
                field: "series".to_string(),
                value: Value::String(series.to_string()),
            });
        }
        if let Some(featured) = filter.featured {
            filters.push(Filter {
                field: "featured".to_string(),
                value: Value::Bool(featured),
            });
        }
        if let Some(available) = filter.available {
            filters.push(Filter {
                field: "available".to_string(),
                value: Value::Bool(available),
            });
        }

        let order_by = match filter.sort.unwrap_or_default() {
            CaravanSort::Newest => None,
            CaravanSort::PriceAsc => Some(OrderBy::asc("price")),
            CaravanSort::PriceDesc => Some(OrderBy::desc("price")),
        };

        let documents = match order_by {
            Some(order_by) => {
                let query = Query {
                    filters,
                    order_by: None,
                    limit: filter.limit,
                }
                .order_by(order_by);
                self.query(collections::CARAVANS, &query).await?
            }
            None => {
                list_recent(self, collections::CARAVANS, filters, &SORT_CHAIN, filter.limit).await?
            }
        };
        Ok(typed_listing::<Caravan>(documents)
            .into_iter()
            .map(Caravan::with_price_range)
            .collect())
    }

    /// Get a caravan by ID.
    pub async fn get_caravan(&self, id: &str) -> Result<Option<Caravan>, AppError> {
        self.get(collections::CARAVANS, id)
            .await?
            .map(caravan_from_document)
            .transpose()
    }

    /// Create a new caravan.
    pub async fn create_caravan(&self, request: &CreateCaravanRequest) -> Result<Caravan, AppError> {
        request.validate()?;
        let document = self
            .create(collections::CARAVANS, to_object(request)?)
            .await?;
        caravan_from_document(document)
    }

    /// Update a caravan. Only the fields present in the request change.
    pub async fn update_caravan(
        &self,
        id: &str,
        request: &UpdateCaravanRequest,
    ) -> Result<Caravan, AppError> {
        request.validate()?;
        let document = self
            .update(collections::CARAVANS, id, to_object(request)?)
            .await?;
        caravan_from_document(document)
    }

    /// Delete a caravan.
    pub async fn delete_caravan(&self, id: &str) -> Result<bool, AppError> {
        self.delete(collections::CARAVANS, id).await
    }
}

fn caravan_from_document(document: Document) -> Result<Caravan, AppError> {
    Ok(document.into_typed::<Caravan>()?.with_price_range())
}
