//! Caravan model listing and detail pages render.

use serde::{Deserialize, Serialize};

use super::timestamp::{lenient, DateValue};
use crate::errors::AppError;

/// One key/value row inside a specification group.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpecItem {
    pub key: String,
    #[serde(default)]
    pub value: String,
}

/// Grouped specifications, e.g. "Chassis" or "Electrical".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SpecificationCategory {
    pub label: String,
    #[serde(default)]
    pub items: Vec<SpecItem>,
}

/// Optional pack priced relative to the base model.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PricingVariant {
    pub name: String,
    #[serde(default)]
    pub price_delta: f64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Caravan {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub berths: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tare_weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub atm_weight: Option<f64>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub specifications: Vec<SpecificationCategory>,
    #[serde(default)]
    pub variants: Vec<PricingVariant>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default = "default_true")]
    pub available: bool,
    #[serde(default)]
    pub featured: bool,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateValue>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateValue>,
    /// Derived on read, never stored.
    #[serde(skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub price_range: Option<PriceRange>,
}

fn default_true() -> bool {
    true
}

impl Caravan {
    /// Base price widened by the cheapest and dearest variant.
    pub fn compute_price_range(&self) -> PriceRange {
        let deltas = self.variants.iter().map(|v| v.price_delta);
        let low = deltas.clone().fold(0.0_f64, f64::min);
        let high = deltas.fold(0.0_f64, f64::max);
        PriceRange {
            min: self.price + low,
            max: self.price + high,
        }
    }

    pub fn with_price_range(mut self) -> Self {
        self.price_range = Some(self.compute_price_range());
        self
    }
}

/// Request body for creating a caravan.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCaravanRequest {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub berths: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tare_weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub atm_weight: Option<f64>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub specifications: Vec<SpecificationCategory>,
    #[serde(default)]
    pub variants: Vec<PricingVariant>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default = "default_true")]
    pub available: bool,
    #[serde(default)]
    pub featured: bool,
}

impl CreateCaravanRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.name.trim().is_empty() {
            return Err(AppError::Validation("Caravan name is required".to_string()));
        }
        validate_price(self.price)?;
        validate_variants(&self.variants)
    }
}

/// Request body for updating a caravan. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCaravanRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub berths: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tare_weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub atm_weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specifications: Option<Vec<SpecificationCategory>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variants: Option<Vec<PricingVariant>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featured: Option<bool>,
}

impl UpdateCaravanRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(AppError::Validation("Caravan name cannot be blank".to_string()));
            }
        }
        if let Some(price) = self.price {
            validate_price(price)?;
        }
        if let Some(variants) = &self.variants {
            validate_variants(variants)?;
        }
        Ok(())
    }
}

fn validate_price(price: f64) -> Result<(), AppError> {
    if !price.is_finite() || price < 0.0 {
        return Err(AppError::Validation(
            "Price must be a non-negative number".to_string(),
        ));
    }
    Ok(())
}

fn validate_variants(variants: &[PricingVariant]) -> Result<(), AppError> {
    if variants.iter().any(|v| v.name.trim().is_empty()) {
        return Err(AppError::Validation("Variant name is required".to_string()));
    }
    if variants.iter().any(|v| !v.price_delta.is_finite()) {
        return Err(AppError::Validation(
            "Variant price delta must be a number".to_string(),
        ));
    }
    Ok(())
}

/// Listing order for caravans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaravanSort {
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
}

/// Listing filters accepted by the caravan endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaravanFilter {
    #[serde(default)]
    pub series: Option<String>,
    #[serde(default)]
    pub featured: Option<bool>,
    #[serde(default)]
    pub available: Option<bool>,
    #[serde(default)]
    pub sort: Option<CaravanSort>,
    #[serde(default)]
    pub limit: Option<usize>,
}
