/// Content models
///
/// Each module defines one collection: the stored document, its create and
/// update payloads with their field rules, and the query filter accepted
/// by its list endpoint.
///
/// # Models
///
/// - `news`: bilingual news items and advertisements
/// - `event`: seminars, talks and other scheduled activities
/// - `document`: research artifacts with version history
/// - `researcher`: researcher profiles
/// - `repository`: named collections of documents owned by a researcher
/// - `category`: time-tracking categories
/// - `time_entry`: time-tracking records
/// - `user`: admin panel credentials

pub mod category;
pub mod document;
pub mod event;
pub mod news;
pub mod repository;
pub mod researcher;
pub mod time_entry;
pub mod user;

use crate::store::Entity;
use crate::validation::FieldError;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use uuid::Uuid;
use validator::Validate;

/// An entity exposed through the generic CRUD service
pub trait Resource: Entity {
    /// Display name used in messages ("Event not found")
    const LABEL: &'static str;

    /// Create payload
    type Create: DeserializeOwned + Validate + Send + 'static;

    /// Partial update payload; `None` fields keep their stored value
    type Update: DeserializeOwned + Validate + Send + 'static;

    /// Equality filters accepted by the list endpoint
    type Filter: DeserializeOwned + Serialize + Default + Send + Sync + 'static;

    /// Builds the document from a payload that passed field validation
    fn from_create(input: Self::Create) -> Result<Self, Vec<FieldError>>;

    /// Merges an update payload into the stored document
    fn apply_update(&mut self, input: Self::Update);

    /// Rules spanning several fields, checked after create and after merge
    fn check(&self) -> Result<(), Vec<FieldError>> {
        Ok(())
    }

    /// Containment document for a filter; unset fields are dropped
    fn filter_document(filter: &Self::Filter) -> Map<String, Value> {
        match serde_json::to_value(filter) {
            Ok(Value::Object(map)) => map.into_iter().filter(|(_, v)| !v.is_null()).collect(),
            _ => Map::new(),
        }
    }
}

/// Filter for collections without list filters
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct NoFilter {}

/// Trims and drops blank entries from a string list
pub(crate) fn clean_list(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

/// Drops repeated ids, keeping the first occurrence of each
pub(crate) fn unique_ids(ids: Vec<Uuid>) -> Vec<Uuid> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}

/// Trims an optional string, mapping blank to `None`
pub(crate) fn clean_opt(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
