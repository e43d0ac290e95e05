/// Postgres JSONB document store
///
/// # Schema
///
/// Each collection is a table of the same name (see `migrations/`):
///
/// ```sql
/// CREATE TABLE news (
///     id UUID PRIMARY KEY,
///     doc JSONB NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// Filters use `doc @> $1` (served by a GIN index). Search compiles
/// `T::SEARCH_FIELDS` into `doc #>> '{path}' ILIKE $1` clauses; field paths
/// are compile-time constants, only the search term is bound.

use super::{Entity, ListQuery, Record, Store, StoreError, StoreResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::{postgres::PgRow, types::Json, PgPool, Row};
use std::marker::PhantomData;
use uuid::Uuid;

/// One collection backed by a Postgres table
pub struct PgStore<T> {
    pool: PgPool,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> PgStore<T> {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            _entity: PhantomData,
        }
    }

    fn map_err(err: sqlx::Error) -> StoreError {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return StoreError::Conflict {
                    collection: T::COLLECTION,
                    constraint: db_err.constraint().unwrap_or("unique").to_string(),
                };
            }
        }

        if let sqlx::Error::ColumnDecode { source, .. } = &err {
            tracing::warn!(collection = T::COLLECTION, error = %source, "Failed to decode document");
        }

        StoreError::Database {
            collection: T::COLLECTION,
            source: err,
        }
    }

    fn from_row(row: PgRow) -> StoreResult<Record<T>> {
        let decode = |row: &PgRow| -> Result<Record<T>, sqlx::Error> {
            let Json(data): Json<T> = row.try_get("doc")?;
            Ok(Record {
                id: row.try_get("id")?,
                data,
                created_at: row.try_get("created_at")?,
                updated_at: row.try_get("updated_at")?,
            })
        };
        decode(&row).map_err(Self::map_err)
    }

    fn search_sql() -> String {
        let clauses: Vec<String> = T::SEARCH_FIELDS
            .iter()
            .map(|field| search_clause(&field.replace('.', ",")))
            .collect();

        format!(
            "SELECT id, doc, created_at, updated_at FROM {} WHERE {} ORDER BY created_at DESC",
            T::COLLECTION,
            if clauses.is_empty() {
                "FALSE".to_string()
            } else {
                clauses.join(" OR ")
            }
        )
    }
}

/// Matches one field; array fields match when any element does
fn search_clause(path: &str) -> String {
    format!(
        "(CASE WHEN jsonb_typeof(doc #> '{{{path}}}') = 'array' \
         THEN EXISTS (SELECT 1 FROM jsonb_array_elements_text(doc #> '{{{path}}}') AS e(value) \
         WHERE e.value ILIKE $1 ESCAPE '\\') \
         ELSE (doc #>> '{{{path}}}') ILIKE $1 ESCAPE '\\' END)"
    )
}

/// Escapes LIKE wildcards so the term matches literally
pub(crate) fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[async_trait]
impl<T: Entity> Store<T> for PgStore<T> {
    async fn insert(&self, data: T) -> StoreResult<Record<T>> {
        let sql = format!(
            "INSERT INTO {} (id, doc) VALUES ($1, $2) RETURNING id, doc, created_at, updated_at",
            T::COLLECTION
        );

        let row = sqlx::query(&sql)
            .bind(Uuid::new_v4())
            .bind(Json(&data))
            .fetch_one(&self.pool)
            .await
            .map_err(Self::map_err)?;

        Self::from_row(row)
    }

    async fn find(&self, query: &ListQuery) -> StoreResult<Vec<Record<T>>> {
        let sql = format!(
            "SELECT id, doc, created_at, updated_at FROM {} WHERE doc @> $1 \
             ORDER BY created_at DESC LIMIT $2 OFFSET $3",
            T::COLLECTION
        );

        // LIMIT NULL means no limit in Postgres
        let rows = sqlx::query(&sql)
            .bind(Json(Value::Object(query.filter.clone())))
            .bind(query.limit)
            .bind(query.offset.unwrap_or(0))
            .fetch_all(&self.pool)
            .await
            .map_err(Self::map_err)?;

        rows.into_iter().map(Self::from_row).collect()
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Record<T>>> {
        let sql = format!(
            "SELECT id, doc, created_at, updated_at FROM {} WHERE id = $1",
            T::COLLECTION
        );

        sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Self::map_err)?
            .map(Self::from_row)
            .transpose()
    }

    async fn replace(&self, id: Uuid, data: T) -> StoreResult<Option<Record<T>>> {
        let sql = format!(
            "UPDATE {} SET doc = $2, updated_at = NOW() WHERE id = $1 \
             RETURNING id, doc, created_at, updated_at",
            T::COLLECTION
        );

        sqlx::query(&sql)
            .bind(id)
            .bind(Json(&data))
            .fetch_optional(&self.pool)
            .await
            .map_err(Self::map_err)?
            .map(Self::from_row)
            .transpose()
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        let sql = format!("DELETE FROM {} WHERE id = $1", T::COLLECTION);

        let result = sqlx::query(&sql)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Self::map_err)?;

        Ok(result.rows_affected() > 0)
    }

    async fn search(&self, term: &str) -> StoreResult<Vec<Record<T>>> {
        let rows = sqlx::query(&Self::search_sql())
            .bind(like_pattern(term))
            .fetch_all(&self.pool)
            .await
            .map_err(Self::map_err)?;

        rows.into_iter().map(Self::from_row).collect()
    }

    async fn count_created(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> StoreResult<i64> {
        let sql = format!(
            "SELECT COUNT(*) FROM {} \
             WHERE ($1::timestamptz IS NULL OR created_at >= $1) \
             AND ($2::timestamptz IS NULL OR created_at < $2)",
            T::COLLECTION
        );

        let (count,): (i64,) = sqlx::query_as(&sql)
            .bind(from)
            .bind(to)
            .fetch_one(&self.pool)
            .await
            .map_err(Self::map_err)?;

        Ok(count)
    }
}
