/// Document repositories
///
/// A repository groups documents under an owning researcher. Both the owner
/// and the document ids are plain references; deleting the target leaves
/// them dangling and they resolve to nothing when populated.

use super::{clean_list, clean_opt, unique_ids, Resource};
use crate::store::Entity;
use crate::validation::{require_text, FieldError};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

fn default_public() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Repository {
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default = "default_public")]
    pub is_public: bool,

    /// Owning researcher id
    #[serde(default)]
    pub owner: Option<Uuid>,

    #[serde(default)]
    pub documents: Vec<Uuid>,

    #[serde(default)]
    pub tags: Vec<String>,
}

impl Entity for Repository {
    const COLLECTION: &'static str = "repositories";
    const SEARCH_FIELDS: &'static [&'static str] = &["name", "description", "tags"];
}

#[derive(Debug, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateRepository {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,

    pub is_public: bool,

    pub owner: Option<Uuid>,

    pub documents: Vec<Uuid>,

    pub tags: Vec<String>,
}

impl Default for CreateRepository {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: None,
            is_public: true,
            owner: None,
            documents: Vec::new(),
            tags: Vec::new(),
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateRepository {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,

    #[validate(length(max = 1000, message = "Description must be at most 1000 characters"))]
    pub description: Option<String>,

    pub is_public: Option<bool>,

    pub owner: Option<Uuid>,

    pub documents: Option<Vec<Uuid>>,

    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryFilter {
    pub owner: Option<Uuid>,
    pub is_public: Option<bool>,
}

/// Body of `PUT /repositories/:id/visibility`
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct SetVisibility {
    #[validate(required(message = "isPublic is required"))]
    pub is_public: Option<bool>,
}

impl Resource for Repository {
    const LABEL: &'static str = "Repository";

    type Create = CreateRepository;
    type Update = UpdateRepository;
    type Filter = RepositoryFilter;

    fn from_create(input: CreateRepository) -> Result<Self, Vec<FieldError>> {
        Ok(Self {
            name: input.name.trim().to_string(),
            description: clean_opt(input.description),
            is_public: input.is_public,
            owner: input.owner,
            documents: unique_ids(input.documents),
            tags: clean_list(input.tags),
        })
    }

    fn apply_update(&mut self, input: UpdateRepository) {
        if let Some(name) = input.name {
            self.name = name.trim().to_string();
        }
        if input.description.is_some() {
            self.description = clean_opt(input.description);
        }
        if let Some(is_public) = input.is_public {
            self.is_public = is_public;
        }
        if input.owner.is_some() {
            self.owner = input.owner;
        }
        if let Some(documents) = input.documents {
            self.documents = unique_ids(documents);
        }
        if let Some(tags) = input.tags {
            self.tags = clean_list(tags);
        }
    }

    fn check(&self) -> Result<(), Vec<FieldError>> {
        match require_text("name", &self.name, 1, "Name must be 1-100 characters") {
            Some(error) => Err(vec![error]),
            None => Ok(()),
        }
    }
}
