/// Generic CRUD service
///
/// One implementation serves every collection; per-entity behavior comes
/// from the [`Resource`] impl (payload types, field rules, cross-field
/// checks, filters).
///
/// # Write path
///
/// 1. Field rules (`Validate` on the payload)
/// 2. Conversion into the entity (`from_create` / `apply_update`)
/// 3. Cross-field rules (`check`) on the complete document
/// 4. Store write; unique violations surface as [`ServiceError::Conflict`]

use super::{ServiceError, ServiceResult};
use crate::models::Resource;
use crate::store::{Backend, ListQuery, Record, Store};
use crate::validation::field_errors;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;
use validator::Validate;

pub struct CrudService<T> {
    store: Arc<dyn Store<T>>,
}

impl<T> Clone for CrudService<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<T: Resource> CrudService<T> {
    pub fn new(store: Arc<dyn Store<T>>) -> Self {
        Self { store }
    }

    pub fn from_backend(backend: &Backend) -> Self {
        Self::new(backend.store::<T>())
    }

    pub async fn create(&self, input: T::Create) -> ServiceResult<Record<T>> {
        input
            .validate()
            .map_err(|e| ServiceError::Validation(field_errors(&e)))?;

        let entity = T::from_create(input).map_err(ServiceError::Validation)?;
        entity.check().map_err(ServiceError::Validation)?;

        let record = self.store.insert(entity).await?;
        info!(collection = T::COLLECTION, id = %record.id, "Created document");
        Ok(record)
    }

    /// Newest first; `filter` fields that are unset match everything
    pub async fn get_all(
        &self,
        filter: &T::Filter,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> ServiceResult<Vec<Record<T>>> {
        let query = ListQuery {
            filter: T::filter_document(filter),
            limit,
            offset,
        };

        let records = self.store.find(&query).await?;
        debug!(collection = T::COLLECTION, count = records.len(), "Listed documents");
        Ok(records)
    }

    pub async fn get_by_id(&self, id: Uuid) -> ServiceResult<Option<Record<T>>> {
        Ok(self.store.find_by_id(id).await?)
    }

    /// Like [`get_by_id`](Self::get_by_id), with a missing document as an error
    pub async fn require(&self, id: Uuid) -> ServiceResult<Record<T>> {
        self.get_by_id(id)
            .await?
            .ok_or(ServiceError::NotFound(T::LABEL))
    }

    /// Partial update; `Ok(None)` when the id is unknown
    pub async fn update(&self, id: Uuid, input: T::Update) -> ServiceResult<Option<Record<T>>> {
        input
            .validate()
            .map_err(|e| ServiceError::Validation(field_errors(&e)))?;

        let Some(mut record) = self.store.find_by_id(id).await? else {
            return Ok(None);
        };

        record.data.apply_update(input);
        self.save(id, record.data).await
    }

    /// Re-checks and writes a complete document
    pub async fn save(&self, id: Uuid, entity: T) -> ServiceResult<Option<Record<T>>> {
        entity.check().map_err(ServiceError::Validation)?;

        let record = self.store.replace(id, entity).await?;
        if record.is_some() {
            info!(collection = T::COLLECTION, %id, "Updated document");
        }
        Ok(record)
    }

    pub async fn delete(&self, id: Uuid) -> ServiceResult<bool> {
        let deleted = self.store.delete(id).await?;
        if deleted {
            info!(collection = T::COLLECTION, %id, "Deleted document");
        }
        Ok(deleted)
    }

    /// Case-insensitive substring search; a blank term is rejected
    pub async fn search(&self, term: &str) -> ServiceResult<Vec<Record<T>>> {
        let term = term.trim();
        if term.is_empty() {
            return Err(ServiceError::validation("q", "Search query is required"));
        }

        let records = self.store.search(term).await?;
        debug!(collection = T::COLLECTION, term, count = records.len(), "Searched documents");
        Ok(records)
    }

    pub async fn count(&self) -> ServiceResult<i64> {
        Ok(self.store.count_created(None, None).await?)
    }

    pub async fn count_created(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> ServiceResult<i64> {
        Ok(self.store.count_created(from, to).await?)
    }
}
