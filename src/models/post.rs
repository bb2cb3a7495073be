//! Blog posts and articles share one shape, stored in separate collections.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::collections;
use super::timestamp::{first_date, lenient, DateValue, RECENCY_FIELDS};
use crate::errors::AppError;

/// Slug used when a title has no word characters at all.
pub const FALLBACK_SLUG: &str = "post";

/// Which feed a post belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostFeed {
    Blogs,
    Articles,
}

impl PostFeed {
    pub fn collection(&self) -> &'static str {
        match self {
            PostFeed::Blogs => collections::BLOGS,
            PostFeed::Articles => collections::ARTICLES,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PostFeed::Blogs => "Blog post",
            PostFeed::Articles => "Article",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Author {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<Author>,
    #[serde(default)]
    pub popular: bool,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub date: Option<DateValue>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateValue>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateValue>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateValue>,
}

impl Post {
    /// First readable date in `RECENCY_FIELDS` order.
    pub fn recency(&self) -> DateTime<Utc> {
        let candidates: Vec<_> = RECENCY_FIELDS
            .iter()
            .map(|field| self.date_field(field))
            .collect();
        first_date(&candidates)
    }

    /// Date field by its stored (camelCase) name.
    fn date_field(&self, name: &str) -> Option<&DateValue> {
        match name {
            "lastUpdated" => self.last_updated.as_ref(),
            "createdAt" => self.created_at.as_ref(),
            "updatedAt" => self.updated_at.as_ref(),
            "date" => self.date.as_ref(),
            _ => None,
        }
    }
}

/// Request body for creating a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePostRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<Author>,
    #[serde(default)]
    pub popular: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

impl CreatePostRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.title.trim().is_empty() {
            return Err(AppError::Validation("Title is required".to_string()));
        }
        Ok(())
    }

    /// Requested slug, or one derived from the title.
    pub fn base_slug(&self) -> String {
        let requested = self
            .slug
            .as_deref()
            .map(slugify)
            .filter(|s| !s.is_empty());
        requested.unwrap_or_else(|| non_empty_slug(slugify(&self.title)))
    }
}

/// Request body for updating a post. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePostRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<Author>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub popular: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

impl UpdatePostRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if let Some(title) = &self.title {
            if title.trim().is_empty() {
                return Err(AppError::Validation("Title cannot be blank".to_string()));
            }
        }
        if let Some(slug) = &self.slug {
            if slugify(slug).is_empty() {
                return Err(AppError::Validation(
                    "Slug must contain at least one letter or digit".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// URL key from free text: lowercase, non-word characters dropped, runs of
/// whitespace, underscores and hyphens collapsed to one hyphen, no hyphen at
/// either end. Only ASCII letters and digits count as word characters.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_separator = false;

    for ch in text.chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_alphanumeric() {
            if pending_separator && !slug.is_empty() {
                slug.push('-');
            }
            pending_separator = false;
            slug.push(ch);
        } else if ch.is_whitespace() || ch == '_' || ch == '-' {
            pending_separator = true;
        }
    }

    slug
}

fn non_empty_slug(slug: String) -> String {
    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug
    }
}

/// `base`, `base-2`, `base-3`, ... for the given attempt number (1-based).
pub fn slug_candidate(base: &str, attempt: usize) -> String {
    if attempt <= 1 {
        base.to_string()
    } else {
        format!("{}-{}", base, attempt)
    }
}
