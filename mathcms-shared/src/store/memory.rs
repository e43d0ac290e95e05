/// In-memory document store
///
/// Documents are kept as JSON values so filters and search behave the same
/// way they do against Postgres JSONB. All collections of one
/// [`MemoryBackend`] share a single map, so every service opened from the
/// same backend sees the same data.

use super::{json_contains, searchable_values, Entity, ListQuery, Record, Store, StoreError, StoreResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Clone)]
struct StoredDoc {
    id: Uuid,
    doc: Value,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Shared state behind every in-memory collection
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    // Insertion order is creation order.
    collections: Arc<RwLock<HashMap<&'static str, Vec<StoredDoc>>>>,
}

impl MemoryBackend {
    pub fn collection<T: Entity>(&self) -> MemoryStore<T> {
        MemoryStore {
            backend: self.clone(),
            _entity: PhantomData,
        }
    }
}

/// One collection of a [`MemoryBackend`]
pub struct MemoryStore<T> {
    backend: MemoryBackend,
    _entity: PhantomData<fn() -> T>,
}

impl<T: Entity> MemoryStore<T> {
    fn encode(data: &T) -> StoreResult<Value> {
        serde_json::to_value(data).map_err(|source| StoreError::Serialization {
            collection: T::COLLECTION,
            source,
        })
    }

    fn decode(stored: &StoredDoc) -> StoreResult<Record<T>> {
        let data = serde_json::from_value(stored.doc.clone()).map_err(|source| {
            StoreError::Serialization {
                collection: T::COLLECTION,
                source,
            }
        })?;

        Ok(Record {
            id: stored.id,
            data,
            created_at: stored.created_at,
            updated_at: stored.updated_at,
        })
    }

    fn check_unique(docs: &[StoredDoc], doc: &Value, except: Option<Uuid>) -> StoreResult<()> {
        for field in T::UNIQUE_FIELDS {
            let Some(candidate) = doc.get(*field).and_then(Value::as_str) else {
                continue;
            };
            let candidate = candidate.to_lowercase();

            let taken = docs.iter().filter(|d| Some(d.id) != except).any(|d| {
                d.doc
                    .get(*field)
                    .and_then(Value::as_str)
                    .map(|v| v.to_lowercase() == candidate)
                    .unwrap_or(false)
            });

            if taken {
                return Err(StoreError::Conflict {
                    collection: T::COLLECTION,
                    constraint: format!("{}_{}_key", T::COLLECTION, field),
                });
            }
        }
        Ok(())
    }

    fn page<'a>(
        docs: impl Iterator<Item = &'a StoredDoc>,
        query: &ListQuery,
    ) -> StoreResult<Vec<Record<T>>> {
        let offset = query.offset.unwrap_or(0).max(0) as usize;
        let limit = query.limit.map(|l| l.max(0) as usize).unwrap_or(usize::MAX);
        docs.skip(offset).take(limit).map(Self::decode).collect()
    }
}

#[async_trait]
impl<T: Entity> Store<T> for MemoryStore<T> {
    async fn insert(&self, data: T) -> StoreResult<Record<T>> {
        let doc = Self::encode(&data)?;
        let mut collections = self.backend.collections.write().await;
        let docs = collections.entry(T::COLLECTION).or_default();

        Self::check_unique(docs, &doc, None)?;

        let now = Utc::now();
        let stored = StoredDoc {
            id: Uuid::new_v4(),
            doc,
            created_at: now,
            updated_at: now,
        };
        docs.push(stored.clone());

        Self::decode(&stored)
    }

    async fn find(&self, query: &ListQuery) -> StoreResult<Vec<Record<T>>> {
        let collections = self.backend.collections.read().await;
        let Some(docs) = collections.get(T::COLLECTION) else {
            return Ok(Vec::new());
        };

        let pattern = Value::Object(query.filter.clone());
        Self::page(
            docs.iter().rev().filter(|d| json_contains(&d.doc, &pattern)),
            query,
        )
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Record<T>>> {
        let collections = self.backend.collections.read().await;
        collections
            .get(T::COLLECTION)
            .and_then(|docs| docs.iter().find(|d| d.id == id))
            .map(Self::decode)
            .transpose()
    }

    async fn replace(&self, id: Uuid, data: T) -> StoreResult<Option<Record<T>>> {
        let doc = Self::encode(&data)?;
        let mut collections = self.backend.collections.write().await;
        let Some(docs) = collections.get_mut(T::COLLECTION) else {
            return Ok(None);
        };

        Self::check_unique(docs, &doc, Some(id))?;

        match docs.iter_mut().find(|d| d.id == id) {
            Some(stored) => {
                stored.doc = doc;
                stored.updated_at = Utc::now();
                Self::decode(stored).map(Some)
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: Uuid) -> StoreResult<bool> {
        let mut collections = self.backend.collections.write().await;
        let Some(docs) = collections.get_mut(T::COLLECTION) else {
            return Ok(false);
        };

        let before = docs.len();
        docs.retain(|d| d.id != id);
        Ok(docs.len() < before)
    }

    async fn search(&self, term: &str) -> StoreResult<Vec<Record<T>>> {
        let needle = term.to_lowercase();
        let collections = self.backend.collections.read().await;
        let Some(docs) = collections.get(T::COLLECTION) else {
            return Ok(Vec::new());
        };

        docs.iter()
            .rev()
            .filter(|d| {
                T::SEARCH_FIELDS.iter().any(|field| {
                    searchable_values(&d.doc, field)
                        .iter()
                        .any(|text| text.to_lowercase().contains(&needle))
                })
            })
            .map(Self::decode)
            .collect()
    }

    async fn count_created(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> StoreResult<i64> {
        let collections = self.backend.collections.read().await;
        let count = collections
            .get(T::COLLECTION)
            .map(|docs| {
                docs.iter()
                    .filter(|d| from.map(|f| d.created_at >= f).unwrap_or(true))
                    .filter(|d| to.map(|t| d.created_at < t).unwrap_or(true))
                    .count()
            })
            .unwrap_or(0);

        Ok(count as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Note {
        title: String,
        email: String,
        tags: Vec<String>,
    }

    impl Entity for Note {
        const COLLECTION: &'static str = "notes";
        const SEARCH_FIELDS: &'static [&'static str] = &["title", "tags"];
        const UNIQUE_FIELDS: &'static [&'static str] = &["email"];
    }

    fn note(title: &str, email: &str, tags: &[&str]) -> Note {
        Note {
            title: title.to_string(),
            email: email.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_find_newest_first() {
        let store = MemoryBackend::default().collection::<Note>();
        store.insert(note("first", "a@x.org", &[])).await.unwrap();
        store.insert(note("second", "b@x.org", &[])).await.unwrap();

        let all = store.find(&ListQuery::default()).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].data.title, "second");
        assert_eq!(all[1].data.title, "first");
    }

    #[tokio::test]
    async fn test_filter_limit_offset() {
        let store = MemoryBackend::default().collection::<Note>();
        for i in 0..5 {
            let tags: &[&str] = if i % 2 == 0 { &["even"] } else { &["odd"] };
            store
                .insert(note(&format!("n{}", i), &format!("{}@x.org", i), tags))
                .await
                .unwrap();
        }

        let filter = json!({ "tags": ["even"] }).as_object().unwrap().clone();
        let evens = store.find(&ListQuery::filtered(filter.clone())).await.unwrap();
        assert_eq!(evens.len(), 3);

        let page = store
            .find(&ListQuery {
                filter,
                limit: Some(1),
                offset: Some(1),
            })
            .await
            .unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].data.title, "n2");
    }

    #[tokio::test]
    async fn test_unique_fields_case_insensitive() {
        let store = MemoryBackend::default().collection::<Note>();
        let first = store.insert(note("a", "Ada@x.org", &[])).await.unwrap();

        let err = store.insert(note("b", "ada@X.org", &[])).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict { .. }));

        // Replacing a document with its own email is fine
        let replaced = store
            .replace(first.id, note("a2", "ADA@x.org", &[]))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(replaced.data.title, "a2");
        assert!(replaced.updated_at >= first.updated_at);
    }

    #[tokio::test]
    async fn test_missing_ids() {
        let store = MemoryBackend::default().collection::<Note>();
        let id = Uuid::new_v4();

        assert!(store.find_by_id(id).await.unwrap().is_none());
        assert!(store.replace(id, note("x", "x@x.org", &[])).await.unwrap().is_none());
        assert!(!store.delete(id).await.unwrap());
    }

    #[tokio::test]
    async fn test_search_case_insensitive() {
        let store = MemoryBackend::default().collection::<Note>();
        store.insert(note("Riemann Hypothesis", "r@x.org", &["Analysis"])).await.unwrap();
        store.insert(note("Knot theory", "k@x.org", &["topology"])).await.unwrap();

        assert_eq!(store.search("riemann").await.unwrap().len(), 1);
        assert_eq!(store.search("ANALYSIS").await.unwrap().len(), 1);
        assert_eq!(store.search("o").await.unwrap().len(), 2);
        assert!(store.search("galois").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_collections_share_backend() {
        let backend = MemoryBackend::default();
        let writer = backend.collection::<Note>();
        let reader = backend.collection::<Note>();

        writer.insert(note("shared", "s@x.org", &[])).await.unwrap();
        assert_eq!(reader.count_created(None, None).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_count_created_window() {
        let store = MemoryBackend::default().collection::<Note>();
        store.insert(note("a", "a@x.org", &[])).await.unwrap();

        let now = Utc::now();
        let hour = chrono::Duration::hours(1);
        assert_eq!(store.count_created(Some(now - hour), None).await.unwrap(), 1);
        assert_eq!(store.count_created(Some(now + hour), None).await.unwrap(), 0);
        assert_eq!(store.count_created(None, Some(now - hour)).await.unwrap(), 0);
    }
}
