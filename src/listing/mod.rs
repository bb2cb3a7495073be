//! List views over already-fetched posts: category filter, date sort and
//! fixed-size pagination.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Post;

pub const PAGE_SIZE: usize = 6;

/// Label that disables category filtering.
pub const ALL_CATEGORIES: &str = "All";

/// Category label and the tags that place a post in it.
pub const CATEGORIES: &[(&str, &[&str])] = &[
    ("Travel Tips", &["travel tips", "tips", "travel"]),
    ("Destinations", &["destinations", "destination", "road trip"]),
    ("Coffee", &["coffee"]),
    ("Maintenance", &["maintenance", "care", "servicing"]),
    ("Off-Road", &["off-road", "offroad", "4wd"]),
    ("Company News", &["news", "company news"]),
];

/// Something that can appear in a tagged, dated list.
pub trait Listed {
    fn tags(&self) -> &[String];
    fn recency(&self) -> DateTime<Utc>;
}

impl Listed for Post {
    fn tags(&self) -> &[String] {
        &self.tags
    }

    fn recency(&self) -> DateTime<Utc> {
        Post::recency(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateSort {
    #[default]
    Newest,
    Oldest,
}

/// Query parameters of a paged list view.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub sort: Option<DateSort>,
    #[serde(default)]
    pub page: Option<usize>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

/// Lowercase, trimmed, inner whitespace collapsed to single spaces.
pub fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Tags accepted for a label. Unknown labels accept themselves.
pub fn category_tags(label: &str) -> Vec<String> {
    let wanted = normalize(label);
    CATEGORIES
        .iter()
        .find(|(name, _)| normalize(name) == wanted)
        .map(|(_, tags)| tags.iter().map(|t| normalize(t)).collect())
        .unwrap_or_else(|| vec![wanted])
}

/// Keep items carrying at least one tag of the category.
pub fn filter_by_category<T: Listed>(items: Vec<T>, label: Option<&str>) -> Vec<T> {
    let label = match label.map(str::trim) {
        Some(l) if !l.is_empty() && normalize(l) != normalize(ALL_CATEGORIES) => l,
        _ => return items,
    };

    let accepted = category_tags(label);
    items
        .into_iter()
        .filter(|item| {
            item.tags()
                .iter()
                .any(|tag| accepted.contains(&normalize(tag)))
        })
        .collect()
}

/// Stable sort by tolerant recency.
pub fn sort_by_date<T: Listed>(items: &mut [T], sort: DateSort) {
    match sort {
        DateSort::Newest => items.sort_by_cached_key(|item| std::cmp::Reverse(item.recency())),
        DateSort::Oldest => items.sort_by_cached_key(|item| item.recency()),
    }
}

/// Slice out one page, clamping the requested page into range.
pub fn paginate<T>(items: Vec<T>, requested: usize) -> Page<T> {
    let total_items = items.len();
    let total_pages = total_items.div_ceil(PAGE_SIZE).max(1);
    let page = requested.clamp(1, total_pages);

    let items = items
        .into_iter()
        .skip((page - 1) * PAGE_SIZE)
        .take(PAGE_SIZE)
        .collect();

    Page {
        items,
        page,
        page_size: PAGE_SIZE,
        total_items,
        total_pages,
    }
}

/// Filter, sort and page in one pass.
pub fn list_view<T: Listed>(items: Vec<T>, params: &ListParams) -> Page<T> {
    let mut items = filter_by_category(items, params.category.as_deref());
    sort_by_date(&mut items, params.sort.unwrap_or_default());
    paginate(items, params.page.unwrap_or(1))
}
