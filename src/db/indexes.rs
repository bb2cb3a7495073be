//! Declared sort indexes.
//!
//! Ordered queries are only served for `createdAt`, `updatedAt` and the
//! (collection, field) pairs listed here; each pair is backed by a partial
//! expression index created at startup.

use crate::models::collections;

/// Fields every collection can be ordered by, stored as real columns.
pub const BUILTIN_SORT_FIELDS: [(&str, &str); 2] =
    [("createdAt", "created_at"), ("updatedAt", "updated_at")];

/// (collection, JSON field) pairs with an expression index.
pub const DECLARED_INDEXES: &[(&str, &str)] = &[
    (collections::CARAVANS, "series"),
    (collections::CARAVANS, "featured"),
    (collections::CARAVANS, "price"),
    (collections::BLOGS, "lastUpdated"),
    (collections::BLOGS, "slug"),
    (collections::ARTICLES, "lastUpdated"),
    (collections::ARTICLES, "slug"),
    (collections::REVIEWS, "caravanId"),
    (collections::BOOKINGS, "caravanId"),
    (collections::NEWSLETTER_SUBSCRIBERS, "email"),
    (collections::DEALERS, "state"),
];

/// Column expression to sort on, or `None` when the field is not indexed.
pub fn sort_expression(collection: &str, field: &str) -> Option<String> {
    if let Some((_, column)) = BUILTIN_SORT_FIELDS.iter().find(|(name, _)| *name == field) {
        return Some((*column).to_string());
    }
    DECLARED_INDEXES
        .iter()
        .any(|(c, f)| *c == collection && *f == field)
        .then(|| json_path_expr(field))
}

/// `json_extract` over the document body. `field` must already be validated.
pub fn json_path_expr(field: &str) -> String {
    format!("json_extract(data, '$.{}')", field)
}

/// DDL for one declared index.
pub fn index_ddl(collection: &str, field: &str) -> String {
    format!(
        "CREATE INDEX IF NOT EXISTS idx_{c}_{f} ON documents ({expr}) WHERE collection = '{c}'",
        c = collection,
        f = field,
        expr = json_path_expr(field),
    )
}

/// Collection and field names: ASCII letters, digits and underscores only.
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= 64
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}
