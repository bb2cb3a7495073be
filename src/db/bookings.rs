//! Booking operations.

use serde_json::{Map, Value};

use super::fallback::list_recent;
use super::store::{DocumentStore, Filter};
use crate::errors::AppError;
use crate::models::{
    collections, to_object, typed_listing, Booking, BookingFilter, BookingStatus,
    CreateBookingRequest,
};

const SORT_CHAIN: [&str; 1] = ["createdAt"];

impl DocumentStore {
    // ==================== BOOKING OPERATIONS ====================

    /// List bookings, newest first.
    pub async fn list_bookings(&self, filter: &BookingFilter) -> Result<Vec<Booking>, AppError> {
        let mut filters = Vec::new();
        if let Some(caravan_id) = filter.caravan_id.as_deref() {
            filters.push(Filter {
                field: "caravanId".to_string(),
                value: Value::String(caravan_id.to_string()),
            });
        }
        if let Some(raw) = filter.status.as_deref() {
            let status = parse_booking_status(raw)?;
            filters.push(Filter {
                field: "status".to_string(),
                value: Value::String(status.as_str().to_string()),
            });
        }

        let documents = list_recent(self, collections::BOOKINGS, filters, &SORT_CHAIN, None).await?;
        Ok(typed_listing(documents))
    }

    /// Record a booking request as Pending.
    pub async fn create_booking(&self, request: &CreateBookingRequest) -> Result<Booking, AppError> {
        request.validate()?;

        let mut data = to_object(request)?;
        data.insert(
            "status".to_string(),
            Value::String(BookingStatus::Pending.as_str().to_string()),
        );

        self.create(collections::BOOKINGS, data).await?.into_typed()
    }

    /// Set a booking's status. Setting the status it already has writes nothing.
    pub async fn update_booking_status(&self, id: &str, raw: &str) -> Result<Booking, AppError> {
        let status = parse_booking_status(raw)?;

        let current: Booking = self
            .get(collections::BOOKINGS, id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Booking {} not found", id)))?
            .into_typed()?;
        if current.status == status {
            return Ok(current);
        }

        let mut changes = Map::new();
        changes.insert(
            "status".to_string(),
            Value::String(status.as_str().to_string()),
        );

        self.update(collections::BOOKINGS, id, changes)
            .await?
            .into_typed()
    }

    pub async fn delete_booking(&self, id: &str) -> Result<bool, AppError> {
        self.delete(collections::BOOKINGS, id).await
    }
}

fn parse_booking_status(raw: &str) -> Result<BookingStatus, AppError> {
    BookingStatus::parse(raw).ok_or_else(|| {
        let allowed: Vec<_> = BookingStatus::ALL.iter().map(|s| s.as_str()).collect();
        AppError::Validation(format!(
            "Unknown booking status '{}'; expected one of {}",
            raw,
            allowed.join(", ")
        ))
    })
}
