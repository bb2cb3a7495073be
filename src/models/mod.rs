//! Data models for the caravan website.
//!
//! Wire names are camelCase to match the frontend's document fields.

mod booking;
mod caravan;
mod dealer;
mod document;
mod inquiry;
mod newsletter;
mod post;
mod review;
mod revision;
pub mod timestamp;

pub use booking::*;
pub use caravan::*;
pub use dealer::*;
pub use document::*;
pub use inquiry::*;
pub use newsletter::*;
pub use post::*;
pub use review::*;
pub use revision::*;

/// Collection names. These are the storage contract shared with the frontend.
pub mod collections {
    pub const CARAVANS: &str = "caravans";
    pub const BOOKINGS: &str = "bookings";
    pub const REVIEWS: &str = "reviews";
    pub const ARTICLES: &str = "articles";
    pub const BLOGS: &str = "blogs";
    pub const NEWSLETTER_SUBSCRIBERS: &str = "newsletter_subscribers";
    pub const DEALERS: &str = "dealers";
    pub const QUOTES: &str = "quotes";
    pub const BROCHURE_REQUESTS: &str = "brochure_requests";
    pub const MANUAL_REQUESTS: &str = "manual_requests";
    pub const WARRANTY_CLAIMS: &str = "warranty_claims";
    pub const CONTACT_INQUIRIES: &str = "contact_inquiries";
    pub const FINANCE_INQUIRIES: &str = "finance_inquiries";
}

/// Cheap shape check: one `@`, something before it, a dotted domain after it.
pub fn is_plausible_email(email: &str) -> bool {
    let email = email.trim();
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}
