//! Generic document store over the `documents` table.
//!
//! Five operations, parameterized by collection name: create, get, query,
//! update and delete. Writes stamp `createdAt`/`updatedAt`, bump the global
//! revision and publish a change event.

use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};
use sqlx::{Row, SqlitePool};

use super::indexes;
use crate::errors::AppError;
use crate::events::{ChangeAction, ChangeEvent, EventHub};
use crate::models::{json_type_name, Document, RevisionInfo};

pub const CREATED_AT: &str = "createdAt";
pub const UPDATED_AT: &str = "updatedAt";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    Ascending,
    #[default]
    Descending,
}

impl Direction {
    fn as_sql(&self) -> &'static str {
        match self {
            Direction::Ascending => "ASC",
            Direction::Descending => "DESC",
        }
    }
}

/// Equality filter on a top-level field.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: String,
    pub value: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub field: String,
    pub direction: Direction,
}

impl OrderBy {
    pub fn desc(field: &str) -> Self {
        Self {
            field: field.to_string(),
            direction: Direction::Descending,
        }
    }

    pub fn asc(field: &str) -> Self {
        Self {
            field: field.to_string(),
            direction: Direction::Ascending,
        }
    }
}

/// Filters, a single sort key and an optional row cap.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Query {
    pub filters: Vec<Filter>,
    pub order_by: Option<OrderBy>,
    pub limit: Option<usize>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.filters.push(Filter {
            field: field.to_string(),
            value: value.into(),
        });
        self
    }

    pub fn order_by(mut self, order_by: OrderBy) -> Self {
        self.order_by = Some(order_by);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Values bound into a generated statement.
enum Bind {
    Text(String),
    Int(i64),
    Real(f64),
}

/// Document store shared by every handler.
#[derive(Clone)]
pub struct DocumentStore {
    pool: SqlitePool,
    events: EventHub,
}

impl DocumentStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self::with_events(pool, EventHub::default())
    }

    pub fn with_events(pool: SqlitePool, events: EventHub) -> Self {
        Self { pool, events }
    }

    pub fn events(&self) -> &EventHub {
        &self.events
    }

    /// Close the pool; called once on shutdown.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    // ==================== REVISION ====================

    /// Get the current revision ID.
    pub async fn get_revision_id(&self) -> Result<i64, AppError> {
        let row = sqlx::query("SELECT revision_id FROM meta WHERE id = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(row.get("revision_id"))
    }

    /// Get revision info.
    pub async fn get_revision_info(&self, project_id: &str) -> Result<RevisionInfo, AppError> {
        let row = sqlx::query("SELECT revision_id, generated_at FROM meta WHERE id = 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(RevisionInfo {
            project_id: project_id.to_string(),
            revision_id: row.get("revision_id"),
            generated_at: row.get("generated_at"),
        })
    }

    // ==================== DOCUMENT OPERATIONS ====================

    /// Create a document with a generated id and server-set timestamps.
    pub async fn create(
        &self,
        collection: &str,
        mut data: Map<String, Value>,
    ) -> Result<Document, AppError> {
        check_name("collection", collection)?;

        let id = uuid::Uuid::new_v4().to_string();
        let now = now_timestamp();
        data.remove("id");
        data.insert(CREATED_AT.to_string(), Value::String(now.clone()));
        data.insert(UPDATED_AT.to_string(), Value::String(now.clone()));
        let body = serde_json::to_string(&data)?;

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO documents (collection, id, data, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(collection)
        .bind(&id)
        .bind(&body)
        .bind(&now)
        .bind(&now)
        .execute(&mut *tx)
        .await?;

        let revision_id = bump_revision(&mut tx, &now).await?;
        tx.commit().await?;

        tracing::debug!("Created {}/{}", collection, id);
        self.publish(collection, &id, ChangeAction::Created, revision_id);

        Ok(Document { id, data })
    }

    /// Fetch a document by id.
    pub async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, AppError> {
        check_name("collection", collection)?;

        let row = sqlx::query("SELECT id, data FROM documents WHERE collection = ? AND id = ?")
            .bind(collection)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(document_from_row).transpose()
    }

    /// Run a filtered, optionally ordered and capped query.
    pub async fn query(&self, collection: &str, query: &Query) -> Result<Vec<Document>, AppError> {
        check_name("collection", collection)?;

        let mut sql = String::from("SELECT id, data FROM documents WHERE collection = ?");
        let mut binds = Vec::new();

        for filter in &query.filters {
            check_name("field", &filter.field)?;
            let expr = indexes::json_path_expr(&filter.field);
            match &filter.value {
                Value::Null => {
                    sql.push_str(&format!(" AND {} IS NULL", expr));
                }
                Value::Bool(b) => {
                    sql.push_str(&format!(" AND {} = ?", expr));
                    binds.push(Bind::Int(i64::from(*b)));
                }
                Value::Number(n) => {
                    sql.push_str(&format!(" AND {} = ?", expr));
                    match n.as_i64() {
                        Some(i) => binds.push(Bind::Int(i)),
                        None => binds.push(Bind::Real(n.as_f64().unwrap_or(f64::NAN))),
                    }
                }
                Value::String(s) => {
                    sql.push_str(&format!(" AND {} = ?", expr));
                    binds.push(Bind::Text(s.clone()));
                }
                other => {
                    return Err(AppError::BadRequest(format!(
                        "Cannot filter {} on a {} value",
                        filter.field,
                        json_type_name(other)
                    )));
                }
            }
        }

        if let Some(order) = &query.order_by {
            check_name("field", &order.field)?;
            let expr = indexes::sort_expression(collection, &order.field).ok_or_else(|| {
                AppError::MissingIndex {
                    collection: collection.to_string(),
                    field: order.field.clone(),
                }
            })?;
            let dir = order.direction.as_sql();
            sql.push_str(&format!(" ORDER BY {} {}, rowid {}", expr, dir, dir));
        }

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            binds.push(Bind::Int(i64::try_from(limit).unwrap_or(i64::MAX)));
        }

        let mut statement = sqlx::query(&sql).bind(collection);
        for bind in binds {
            statement = match bind {
                Bind::Text(s) => statement.bind(s),
                Bind::Int(i) => statement.bind(i),
                Bind::Real(f) => statement.bind(f),
            };
        }

        let rows = statement.fetch_all(&self.pool).await?;
        rows.iter().map(document_from_row).collect()
    }

    /// First document whose `field` equals `value`.
    pub async fn find_one(
        &self,
        collection: &str,
        field: &str,
        value: impl Into<Value>,
    ) -> Result<Option<Document>, AppError> {
        let query = Query::new().filter(field, value).limit(1);
        Ok(self.query(collection, &query).await?.into_iter().next())
    }

    /// Shallow-merge `changes` into a document. `null` removes a field;
    /// `id` and `createdAt` cannot be changed.
    pub async fn update(
        &self,
        collection: &str,
        id: &str,
        changes: Map<String, Value>,
    ) -> Result<Document, AppError> {
        check_name("collection", collection)?;

        let mut tx = self.pool.begin().await?;

        let row = sqlx::query("SELECT id, data FROM documents WHERE collection = ? AND id = ?")
            .bind(collection)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        let mut document = row
            .as_ref()
            .map(document_from_row)
            .transpose()?
            .ok_or_else(|| AppError::NotFound(format!("{} {} not found", collection, id)))?;

        for (key, value) in changes {
            if key == "id" || key == CREATED_AT {
                continue;
            }
            if value.is_null() {
                document.data.remove(&key);
            } else {
                document.data.insert(key, value);
            }
        }

        let now = now_timestamp();
        document
            .data
            .insert(UPDATED_AT.to_string(), Value::String(now.clone()));
        let body = serde_json::to_string(&document.data)?;

        sqlx::query("UPDATE documents SET data = ?, updated_at = ? WHERE collection = ? AND id = ?")
            .bind(&body)
            .bind(&now)
            .bind(collection)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let revision_id = bump_revision(&mut tx, &now).await?;
        tx.commit().await?;

        tracing::debug!("Updated {}/{}", collection, id);
        self.publish(collection, id, ChangeAction::Updated, revision_id);

        Ok(document)
    }

    /// Remove a document. Deleting a missing id is not an error; the return
    /// value says whether anything was removed.
    pub async fn delete(&self, collection: &str, id: &str) -> Result<bool, AppError> {
        check_name("collection", collection)?;

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query("DELETE FROM documents WHERE collection = ? AND id = ?")
            .bind(collection)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            tracing::debug!("Delete of missing {}/{} ignored", collection, id);
            return Ok(false);
        }

        let revision_id = bump_revision(&mut tx, &now_timestamp()).await?;
        tx.commit().await?;

        tracing::debug!("Deleted {}/{}", collection, id);
        self.publish(collection, id, ChangeAction::Deleted, revision_id);

        Ok(true)
    }

    fn publish(&self, collection: &str, id: &str, action: ChangeAction, revision_id: i64) {
        self.events.publish(ChangeEvent {
            collection: collection.to_string(),
            id: id.to_string(),
            action,
            revision_id,
        });
    }
}

/// Fixed-width UTC timestamp so stored values sort lexicographically.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn check_name(kind: &str, name: &str) -> Result<(), AppError> {
    if indexes::is_valid_name(name) {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!("Invalid {} name: {}", kind, name)))
    }
}

async fn bump_revision(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    now: &str,
) -> Result<i64, AppError> {
    let row = sqlx::query(
        "UPDATE meta SET revision_id = revision_id + 1, generated_at = ? WHERE id = 1 RETURNING revision_id",
    )
    .bind(now)
    .fetch_one(&mut **tx)
    .await?;
    Ok(row.get("revision_id"))
}

fn document_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Document, AppError> {
    let id: String = row.get("id");
    let body: String = row.get("data");
    match serde_json::from_str::<Value>(&body) {
        Ok(Value::Object(data)) => Ok(Document { id, data }),
        Ok(_) | Err(_) => Err(AppError::Internal(format!(
            "Stored document {} is not a JSON object",
            id
        ))),
    }
}
