//! Customer review model.

use serde::{Deserialize, Serialize};

use super::timestamp::{lenient, DateValue};
use crate::errors::AppError;

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: String,
    #[serde(default)]
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caravan_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caravan_name: Option<String>,
    #[serde(default)]
    pub rating: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub body: String,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub date: Option<DateValue>,
    #[serde(default)]
    pub verified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trip_highlight: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateValue>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateValue>,
}

/// Public review submission. Reviews always start unverified.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateReviewRequest {
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caravan_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caravan_name: Option<String>,
    pub rating: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub body: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trip_highlight: Option<String>,
}

impl CreateReviewRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.author.trim().is_empty() {
            return Err(AppError::Validation("Author is required".to_string()));
        }
        if self.body.trim().is_empty() {
            return Err(AppError::Validation("Review text is required".to_string()));
        }
        validate_rating(self.rating)
    }
}

/// Admin edit of a review, including verification.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReviewRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caravan_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caravan_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trip_highlight: Option<String>,
}

impl UpdateReviewRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if let Some(rating) = self.rating {
            validate_rating(rating)?;
        }
        if matches!(&self.author, Some(a) if a.trim().is_empty()) {
            return Err(AppError::Validation("Author cannot be blank".to_string()));
        }
        if matches!(&self.body, Some(b) if b.trim().is_empty()) {
            return Err(AppError::Validation("Review text cannot be blank".to_string()));
        }
        Ok(())
    }
}

fn validate_rating(rating: u8) -> Result<(), AppError> {
    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err(AppError::Validation(format!(
            "Rating must be between {} and {}",
            MIN_RATING, MAX_RATING
        )));
    }
    Ok(())
}

/// Aggregate shown next to a model's reviews.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSummary {
    pub caravan_id: String,
    pub count: usize,
    pub average_rating: f64,
}

impl ReviewSummary {
    pub fn from_reviews(caravan_id: &str, reviews: &[Review]) -> Self {
        let rated: Vec<u8> = reviews
            .iter()
            .map(|r| r.rating)
            .filter(|r| (MIN_RATING..=MAX_RATING).contains(r))
            .collect();

        let average_rating = if rated.is_empty() {
            0.0
        } else {
            let total: u32 = rated.iter().map(|r| u32::from(*r)).sum();
            let mean = f64::from(total) / rated.len() as f64;
            (mean * 10.0).round() / 10.0
        };

        Self {
            caravan_id: caravan_id.to_string(),
            count: reviews.len(),
            average_rating,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewFilter {
    #[serde(default)]
    pub caravan_id: Option<String>,
    #[serde(default)]
    pub verified: Option<bool>,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn review(rating: u8) -> Review {
        serde_json::from_value(json!({
            "id": format!("r{}", rating),
            "author": "Sam",
            "rating": rating,
            "body": "Great van"
        }))
        .unwrap()
    }

    #[test]
    fn test_rating_bounds() {
        let mut req: CreateReviewRequest = serde_json::from_value(json!({
            "author": "Alex",
            "rating": 5,
            "body": "Loved it"
        }))
        .unwrap();
        assert!(req.validate().is_ok());

        req.rating = 0;
        assert!(matches!(req.validate(), Err(AppError::Validation(_))));
        req.rating = 6;
        assert!(matches!(req.validate(), Err(AppError::Validation(_))));
    }

    #[test]
    fn test_summary_average() {
        let summary = ReviewSummary::from_reviews("c1", &[review(5), review(4), review(4)]);
        assert_eq!(summary.count, 3);
        assert_eq!(summary.average_rating, 4.3);
    }

    #[test]
    fn test_summary_empty() {
        let summary = ReviewSummary::from_reviews("c1", &[]);
        assert_eq!(summary.count, 0);
        assert_eq!(summary.average_rating, 0.0);
    }
}
