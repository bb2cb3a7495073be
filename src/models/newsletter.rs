//! Newsletter subscriber model.

use serde::{Deserialize, Serialize};

use super::is_plausible_email;
use super::timestamp::{lenient, DateValue};
use crate::errors::AppError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subscriber {
    pub id: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateValue>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateValue>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribeRequest {
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl SubscribeRequest {
    /// Validated copy with the email trimmed and lowercased.
    pub fn normalized(&self) -> Result<Self, AppError> {
        let email = normalize_email(&self.email);
        if !is_plausible_email(&email) {
            return Err(AppError::Validation(
                "A valid email address is required".to_string(),
            ));
        }
        Ok(Self {
            email,
            name: self.name.clone().filter(|n| !n.trim().is_empty()),
            source: self.source.clone(),
        })
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribeOutcome {
    pub subscriber: Subscriber,
    pub already_subscribed: bool,
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
