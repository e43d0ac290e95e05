/// Time-tracking categories

use super::{clean_opt, NoFilter, Resource};
use crate::store::Entity;
use crate::validation::{require_text, validate_hex_color, FieldError};
use serde::{Deserialize, Serialize};
use validator::Validate;

pub const DEFAULT_COLOR: &str = "#3B82F6";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    /// `#RRGGBB`
    pub color: String,
}

impl Entity for Category {
    const COLLECTION: &'static str = "categories";
    const SEARCH_FIELDS: &'static [&'static str] = &["name", "description"];
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateCategory {
    #[validate(length(min = 1, max = 50, message = "Name must be 1-50 characters"))]
    pub name: String,

    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,

    #[validate(custom(function = "validate_hex_color"))]
    pub color: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateCategory {
    #[validate(length(min = 1, max = 50, message = "Name must be 1-50 characters"))]
    pub name: Option<String>,

    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,

    #[validate(custom(function = "validate_hex_color"))]
    pub color: Option<String>,
}

impl Resource for Category {
    const LABEL: &'static str = "Category";

    type Create = CreateCategory;
    type Update = UpdateCategory;
    type Filter = NoFilter;

    fn from_create(input: CreateCategory) -> Result<Self, Vec<FieldError>> {
        Ok(Self {
            name: input.name.trim().to_string(),
            description: clean_opt(input.description),
            color: input
                .color
                .map(|c| c.to_uppercase())
                .unwrap_or_else(|| DEFAULT_COLOR.to_string()),
        })
    }

    fn apply_update(&mut self, input: UpdateCategory) {
        if let Some(name) = input.name {
            self.name = name.trim().to_string();
        }
        if input.description.is_some() {
            self.description = clean_opt(input.description);
        }
        if let Some(color) = input.color {
            self.color = color.to_uppercase();
        }
    }

    fn check(&self) -> Result<(), Vec<FieldError>> {
        match require_text("name", &self.name, 1, "Name must be 1-50 characters") {
            Some(error) => Err(vec![error]),
            None => Ok(()),
        }
    }
}
