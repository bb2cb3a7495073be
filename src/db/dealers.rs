//! Dealer locator operations.

use super::fallback::list_recent;
use super::store::DocumentStore;
use crate::errors::AppError;
use crate::models::{
    collections, haversine_km, to_object, typed_listing, CreateDealerRequest, Dealer, DealerFilter,
    NearbyDealer, NearestQuery, UpdateDealerRequest,
};

const SORT_CHAIN: [&str; 1] = ["createdAt"];

impl DocumentStore {
    // ==================== DEALER OPERATIONS ====================

    /// List dealers, optionally limited to one state (case-insensitive).
    pub async fn list_dealers(&self, filter: &DealerFilter) -> Result<Vec<Dealer>, AppError> {
        let documents = list_recent(self, collections::DEALERS, Vec::new(), &SORT_CHAIN, None).await?;
        let dealers: Vec<Dealer> = typed_listing(documents);

        let wanted = filter.state.as_deref().map(str::trim).filter(|s| !s.is_empty());
        Ok(match wanted {
            Some(state) => dealers
                .into_iter()
                .filter(|d| {
                    d.state
                        .as_deref()
                        .is_some_and(|s| s.trim().eq_ignore_ascii_case(state))
                })
                .collect(),
            None => dealers,
        })
    }

    /// Closest dealers with known coordinates, nearest first.
    pub async fn nearest_dealers(&self, query: &NearestQuery) -> Result<Vec<NearbyDealer>, AppError> {
        if !(-90.0..=90.0).contains(&query.lat) || !(-180.0..=180.0).contains(&query.lng) {
            return Err(AppError::Validation("Coordinates out of range".to_string()));
        }

        let origin = (query.lat, query.lng);
        let mut nearby: Vec<NearbyDealer> = self
            .list_dealers(&DealerFilter::default())
            .await?
            .into_iter()
            .filter_map(|dealer| {
                let distance_km = haversine_km(origin, dealer.coordinates()?);
                Some(NearbyDealer {
                    dealer,
                    distance_km,
                })
            })
            .collect();

        nearby.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
        nearby.truncate(query.limit);
        Ok(nearby)
    }

    pub async fn get_dealer(&self, id: &str) -> Result<Option<Dealer>, AppError> {
        self.get(collections::DEALERS, id)
            .await?
            .map(|d| d.into_typed())
            .transpose()
    }

    pub async fn create_dealer(&self, request: &CreateDealerRequest) -> Result<Dealer, AppError> {
        request.validate()?;
        self.create(collections::DEALERS, to_object(request)?)
            .await?
            .into_typed()
    }

    pub async fn update_dealer(
        &self,
        id: &str,
        request: &UpdateDealerRequest,
    ) -> Result<Dealer, AppError> {
        request.validate()?;
        self.update(collections::DEALERS, id, to_object(request)?)
            .await?
            .into_typed()
    }

    pub async fn delete_dealer(&self, id: &str) -> Result<bool, AppError> {
        self.delete(collections::DEALERS, id).await
    }
}
