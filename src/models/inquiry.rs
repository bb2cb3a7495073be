//! Inquiry workflows: quotes, brochure and manual requests, warranty claims,
//! contact and finance inquiries.
//!
//! All six share one record shape. Each kind keeps its own collection and its
//! own closed status enumeration, listed in forward order.

use serde::{Deserialize, Serialize};

use super::timestamp::{lenient, DateValue};
use super::{collections, is_plausible_email};
use crate::errors::AppError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum InquiryKind {
    Quote,
    Brochure,
    Manual,
    Warranty,
    Contact,
    Finance,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum InquiryStatus {
    #[default]
    New,
    Contacted,
    Quoted,
    Sent,
    #[serde(rename = "Followed Up")]
    FollowedUp,
    Resolved,
    Closed,
}

impl InquiryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InquiryStatus::New => "New",
            InquiryStatus::Contacted => "Contacted",
            InquiryStatus::Quoted => "Quoted",
            InquiryStatus::Sent => "Sent",
            InquiryStatus::FollowedUp => "Followed Up",
            InquiryStatus::Resolved => "Resolved",
            InquiryStatus::Closed => "Closed",
        }
    }
}

const QUOTE_FLOW: &[InquiryStatus] = &[
    InquiryStatus::New,
    InquiryStatus::Contacted,
    InquiryStatus::Quoted,
    InquiryStatus::Closed,
];

const DOCUMENT_FLOW: &[InquiryStatus] = &[
    InquiryStatus::New,
    InquiryStatus::Sent,
    InquiryStatus::FollowedUp,
    InquiryStatus::Closed,
];

const SUPPORT_FLOW: &[InquiryStatus] = &[
    InquiryStatus::New,
    InquiryStatus::Contacted,
    InquiryStatus::Resolved,
    InquiryStatus::Closed,
];

impl InquiryKind {
    pub const ALL: [InquiryKind; 6] = [
        InquiryKind::Quote,
        InquiryKind::Brochure,
        InquiryKind::Manual,
        InquiryKind::Warranty,
        InquiryKind::Contact,
        InquiryKind::Finance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InquiryKind::Quote => "quote",
            InquiryKind::Brochure => "brochure",
            InquiryKind::Manual => "manual",
            InquiryKind::Warranty => "warranty",
            InquiryKind::Contact => "contact",
            InquiryKind::Finance => "finance",
        }
    }

    /// Parse the path segment used by the API (`quote`, `quotes`, ...).
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim().to_ascii_lowercase();
        let singular = s.strip_suffix('s').unwrap_or(&s);
        Self::ALL.into_iter().find(|kind| kind.as_str() == singular)
    }

    pub fn collection(&self) -> &'static str {
        match self {
            InquiryKind::Quote => collections::QUOTES,
            InquiryKind::Brochure => collections::BROCHURE_REQUESTS,
            InquiryKind::Manual => collections::MANUAL_REQUESTS,
            InquiryKind::Warranty => collections::WARRANTY_CLAIMS,
            InquiryKind::Contact => collections::CONTACT_INQUIRIES,
            InquiryKind::Finance => collections::FINANCE_INQUIRIES,
        }
    }

    /// What the `subject` field holds for this kind.
    pub fn subject_label(&self) -> &'static str {
        match self {
            InquiryKind::Quote | InquiryKind::Finance => "Model",
            InquiryKind::Brochure => "Brochure",
            InquiryKind::Manual => "Manual",
            InquiryKind::Warranty => "Issue description",
            InquiryKind::Contact => "Enquiry",
        }
    }

    pub fn statuses(&self) -> &'static [InquiryStatus] {
        match self {
            InquiryKind::Quote | InquiryKind::Finance => QUOTE_FLOW,
            InquiryKind::Brochure | InquiryKind::Manual => DOCUMENT_FLOW,
            InquiryKind::Warranty | InquiryKind::Contact => SUPPORT_FLOW,
        }
    }

    pub fn initial_status(&self) -> InquiryStatus {
        self.statuses()[0]
    }

    /// Resolve a status name against this kind's enumeration.
    pub fn parse_status(&self, raw: &str) -> Result<InquiryStatus, AppError> {
        let wanted = raw.trim();
        self.statuses()
            .iter()
            .copied()
            .find(|status| status.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                let allowed: Vec<&str> = self.statuses().iter().map(|s| s.as_str()).collect();
                AppError::Validation(format!(
                    "Status '{}' is not valid for {} inquiries; expected one of: {}",
                    wanted,
                    self.as_str(),
                    allowed.join(", ")
                ))
            })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Inquiry {
    pub id: String,
    pub kind: InquiryKind,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postcode: Option<String>,
    #[serde(default)]
    pub subject: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dealer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default)]
    pub status: InquiryStatus,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateValue>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateValue>,
}

impl Inquiry {
    /// Case-insensitive substring match over the fields the admin search box covers.
    pub fn matches_search(&self, needle: &str) -> bool {
        let needle = needle.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        [
            Some(self.name.as_str()),
            Some(self.email.as_str()),
            Some(self.subject.as_str()),
            self.phone.as_deref(),
            self.postcode.as_deref(),
            self.dealer.as_deref(),
        ]
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(&needle))
    }
}

/// Public form submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitInquiryRequest {
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postcode: Option<String>,
    #[serde(default)]
    pub subject: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dealer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SubmitInquiryRequest {
    pub fn validate(&self, kind: InquiryKind) -> Result<(), AppError> {
        if self.name.trim().is_empty() {
            return Err(AppError::Validation("Name is required".to_string()));
        }
        if !is_plausible_email(&self.email) {
            return Err(AppError::Validation(
                "A valid email address is required".to_string(),
            ));
        }
        if self.subject.trim().is_empty() {
            return Err(AppError::Validation(format!(
                "{} is required",
                kind.subject_label()
            )));
        }
        if let Some(postcode) = self.postcode.as_deref().map(str::trim) {
            if !postcode.is_empty() && !postcode.chars().all(|c| c.is_ascii_digit()) {
                return Err(AppError::Validation(
                    "Postcode must contain digits only".to_string(),
                ));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InquiryFilter {
    #[serde(default)]
    pub status: Option<String>,
    /// Free-text search
    #[serde(default)]
    pub q: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StatusCount {
    pub status: InquiryStatus,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct InquiryStats {
    pub kind: InquiryKind,
    pub total: usize,
    pub statuses: Vec<StatusCount>,
}

impl InquiryStats {
    pub fn tally(kind: InquiryKind, inquiries: &[Inquiry]) -> Self {
        let statuses = kind
            .statuses()
            .iter()
            .map(|status| StatusCount {
                status: *status,
                count: inquiries.iter().filter(|i| i.status == *status).count(),
            })
            .collect();

        Self {
            kind,
            total: inquiries.len(),
            statuses,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_parse_accepts_plurals() {
        assert_eq!(InquiryKind::parse("quotes"), Some(InquiryKind::Quote));
        assert_eq!(InquiryKind::parse("Warranty"), Some(InquiryKind::Warranty));
        assert_eq!(InquiryKind::parse("brochures"), Some(InquiryKind::Brochure));
        assert_eq!(InquiryKind::parse("newsletter"), None);
    }

    #[test]
    fn test_each_kind_starts_new() {
        for kind in InquiryKind::ALL {
            assert_eq!(kind.initial_status(), InquiryStatus::New);
            assert_eq!(kind.statuses().last(), Some(&InquiryStatus::Closed));
        }
    }

    #[test]
    fn test_status_enumerations_are_per_kind() {
        assert!(InquiryKind::Brochure.parse_status("Followed Up").is_ok());
        assert!(InquiryKind::Brochure.parse_status("quoted").is_err());
        assert_eq!(
            InquiryKind::Quote.parse_status("quoted").unwrap(),
            InquiryStatus::Quoted
        );
        assert!(matches!(
            InquiryKind::Quote.parse_status("Sent"),
            Err(AppError::Validation(_))
        ));
        assert!(InquiryKind::Warranty.parse_status("Resolved").is_ok());
    }

    #[test]
    fn test_status_wire_name() {
        assert_eq!(
            serde_json::to_value(InquiryStatus::FollowedUp).unwrap(),
            json!("Followed Up")
        );
        let parsed: InquiryStatus = serde_json::from_value(json!("Followed Up")).unwrap();
        assert_eq!(parsed, InquiryStatus::FollowedUp);
    }

    #[test]
    fn test_submit_validation_names_subject() {
        let req: SubmitInquiryRequest = serde_json::from_value(json!({
            "name": "Kim",
            "email": "kim@example.com",
            "subject": ""
        }))
        .unwrap();
        match req.validate(InquiryKind::Warranty) {
            Err(AppError::Validation(msg)) => assert_eq!(msg, "Issue description is required"),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_postcode_digits_only() {
        let req: SubmitInquiryRequest = serde_json::from_value(json!({
            "name": "Kim",
            "email": "kim@example.com",
            "subject": "Outback 21",
            "postcode": "40a0"
        }))
        .unwrap();
        assert!(req.validate(InquiryKind::Quote).is_err());
    }

    #[test]
    fn test_search_and_tally() {
        let make = |name: &str, status: &str| -> Inquiry {
            serde_json::from_value(json!({
                "id": name,
                "kind": "quote",
                "name": name,
                "email": format!("{}@example.com", name.to_lowercase()),
                "subject": "Outback 21",
                "status": status
            }))
            .unwrap()
        };
        let items = vec![make("Ava", "New"), make("Ben", "Quoted"), make("Cal", "New")];

        assert!(items[0].matches_search("AVA@"));
        assert!(items[1].matches_search("outback"));
        assert!(!items[2].matches_search("ben"));

        let stats = InquiryStats::tally(InquiryKind::Quote, &items);
        assert_eq!(stats.total, 3);
        assert_eq!(
            stats.statuses[0],
            StatusCount { status: InquiryStatus::New, count: 2 }
        );
        assert_eq!(stats.statuses[2].count, 1);
    }
}
