/// Document storage
///
/// Every entity is persisted as a JSON document in its own collection. The
/// storage layer owns the id and the `createdAt`/`updatedAt` timestamps;
/// entity structs only describe the document body.
///
/// # Backends
///
/// - [`postgres::PgStore`]: one JSONB table per collection (production)
/// - [`memory::MemoryStore`]: process-local map (tests, local development)
///
/// Both implement [`Store`] with the same filter and search semantics.
///
/// # Example
///
/// ```no_run
/// use mathcms_shared::models::news::News;
/// use mathcms_shared::store::{Backend, ListQuery};
///
/// # async fn example(backend: Backend) -> Result<(), Box<dyn std::error::Error>> {
/// let store = backend.store::<News>();
/// let latest = store.find(&ListQuery::default()).await?;
/// println!("{} news items", latest.len());
/// # Ok(())
/// # }
/// ```

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

/// A document type stored in its own collection
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + Unpin + 'static {
    /// Collection (table) name
    const COLLECTION: &'static str;

    /// Fields matched by free-text search, as dotted paths into the document
    const SEARCH_FIELDS: &'static [&'static str];

    /// Top-level string fields that must be unique, compared case-insensitively
    const UNIQUE_FIELDS: &'static [&'static str] = &[];
}

/// A stored document with its storage-maintained metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record<T> {
    pub id: Uuid,

    #[serde(flatten)]
    pub data: T,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

/// Options for listing documents
///
/// `filter` is matched by JSON containment: every key/value in the filter
/// must appear in the document, and a filter array matches when each of
/// its elements is present in the document's array.
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    pub filter: Map<String, Value>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl ListQuery {
    pub fn filtered(filter: Map<String, Value>) -> Self {
        Self {
            filter,
            ..Default::default()
        }
    }
}

/// Storage errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Unique constraint violated; carries the constraint or field name
    #[error("Unique constraint violated on {collection}: {constraint}")]
    Conflict {
        collection: &'static str,
        constraint: String,
    },

    /// Document could not be (de)serialized
    #[error("Malformed document in {collection}: {source}")]
    Serialization {
        collection: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// Underlying database failure
    #[error("Database error on {collection}: {source}")]
    Database {
        collection: &'static str,
        #[source]
        source: sqlx::Error,
    },
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Collection operations shared by every backend
///
/// Results are ordered newest first. `find_by_id`, `replace` and `delete`
/// report a missing document through `None`/`false`, never an error.
#[async_trait]
pub trait Store<T: Entity>: Send + Sync {
    /// Inserts a new document, assigning its id and timestamps
    async fn insert(&self, data: T) -> StoreResult<Record<T>>;

    /// Lists documents matching `query.filter`
    async fn find(&self, query: &ListQuery) -> StoreResult<Vec<Record<T>>>;

    /// Gets a single document
    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Record<T>>>;

    /// Replaces the document body and bumps `updated_at`
    async fn replace(&self, id: Uuid, data: T) -> StoreResult<Option<Record<T>>>;

    /// Deletes a document
    async fn delete(&self, id: Uuid) -> StoreResult<bool>;

    /// Case-insensitive substring search over `T::SEARCH_FIELDS`
    async fn search(&self, term: &str) -> StoreResult<Vec<Record<T>>>;

    /// Counts documents created in `[from, to)`; open ends are unbounded
    async fn count_created(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> StoreResult<i64>;
}

/// Storage backend selected at startup
#[derive(Clone)]
pub enum Backend {
    Postgres(PgPool),
    Memory(memory::MemoryBackend),
}

impl Backend {
    /// A fresh in-memory backend
    pub fn memory() -> Self {
        Backend::Memory(memory::MemoryBackend::default())
    }

    /// Opens the collection for `T`
    pub fn store<T: Entity>(&self) -> Arc<dyn Store<T>> {
        match self {
            Backend::Postgres(pool) => Arc::new(postgres::PgStore::<T>::new(pool.clone())),
            Backend::Memory(backend) => Arc::new(backend.collection::<T>()),
        }
    }

    /// Name reported by health checks
    pub fn name(&self) -> &'static str {
        match self {
            Backend::Postgres(_) => "postgres",
            Backend::Memory(_) => "memory",
        }
    }

    /// Verifies the backend is reachable
    pub async fn ping(&self) -> bool {
        match self {
            Backend::Postgres(pool) => crate::db::pool::health_check(pool).await.is_ok(),
            Backend::Memory(_) => true,
        }
    }
}

/// JSON containment with Postgres `@>` semantics
pub(crate) fn json_contains(doc: &Value, pattern: &Value) -> bool {
    match (doc, pattern) {
        (Value::Object(d), Value::Object(p)) => p
            .iter()
            .all(|(k, pv)| d.get(k).map(|dv| json_contains(dv, pv)).unwrap_or(false)),
        (Value::Array(d), Value::Array(p)) => {
            p.iter().all(|pv| d.iter().any(|dv| json_contains(dv, pv)))
        }
        _ => doc == pattern,
    }
}

/// Texts searched for a dotted path; arrays contribute one text per element
pub(crate) fn searchable_values(doc: &Value, path: &str) -> Vec<String> {
    fn text(value: &Value) -> Option<String> {
        match value {
            Value::Null | Value::Array(_) | Value::Object(_) => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    let pointer = format!("/{}", path.replace('.', "/"));
    match doc.pointer(&pointer) {
        Some(Value::Array(items)) => items.iter().filter_map(text).collect(),
        Some(value) => text(value).into_iter().collect(),
        None => Vec::new(),
    }
}
