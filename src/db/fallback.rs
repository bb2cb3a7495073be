//! Recency listing with a sort-field fallback cascade.
//!
//! Ordered queries are attempted for each field of the sort chain in turn.
//! A field without an index moves on to the next one; when none of them can
//! be served the collection is fetched unsorted. Whatever comes back is
//! re-sorted here by the tolerant sort date. The limit is applied after that
//! sort, never in SQL, as the SQL order may differ from the fallback order.

use super::store::{DocumentStore, Filter, OrderBy, Query};
use crate::errors::AppError;
use crate::models::timestamp::sort_date;
use crate::models::Document;

/// Newest-first documents of `collection` matching `filters`.
pub async fn list_recent(
    store: &DocumentStore,
    collection: &str,
    filters: Vec<Filter>,
    sort_chain: &[&str],
    limit: Option<usize>,
) -> Result<Vec<Document>, AppError> {
    let mut found = None;

    for field in sort_chain {
        let query = Query {
            filters: filters.clone(),
            order_by: Some(OrderBy::desc(field)),
            limit: None,
        };
        match store.query(collection, &query).await {
            Ok(documents) => {
                found = Some(documents);
                break;
            }
            Err(AppError::MissingIndex { .. }) => {
                tracing::warn!(
                    "No index for {}.{}, falling back to the next sort field",
                    collection,
                    field
                );
            }
            Err(e) => return Err(e),
        }
    }

    let mut documents = match found {
        Some(documents) => documents,
        None => {
            tracing::warn!("Listing {} unsorted", collection);
            let query = Query {
                filters,
                order_by: None,
                limit: None,
            };
            store.query(collection, &query).await?
        }
    };

    sort_newest_first(&mut documents, sort_chain);
    if let Some(limit) = limit {
        documents.truncate(limit);
    }

    Ok(documents)
}

/// Stable newest-first sort by the first readable date in `fields`.
pub fn sort_newest_first(documents: &mut [Document], fields: &[&str]) {
    documents.sort_by_cached_key(|doc| std::cmp::Reverse(sort_date(&doc.data, fields)));
}
