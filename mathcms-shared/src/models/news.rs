/// News model
///
/// News items carry a title in both site locales (English and French).
/// Advertisements shown on the public site are news items in the
/// `advertisement` category.
///
/// # Document
///
/// ```json
/// {
///   "title": { "en": "Colloquium series", "fr": "Cycle de colloques" },
///   "content": "...",
///   "status": "published",
///   "category": "seminar",
///   "image": "/uploads/images/1700000000000-42.png",
///   "author": "Communications office"
/// }
/// ```

use super::{clean_opt, Resource};
use crate::store::Entity;
use crate::validation::{prefixed_field_errors, require_text, FieldError};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Publication state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NewsStatus {
    #[default]
    Draft,
    Published,
    Archived,
}

/// Editorial category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NewsCategory {
    Announcement,
    Seminar,
    Award,
    Publication,
    Advertisement,
    #[default]
    General,
}

/// Title in both site locales
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct LocalizedTitle {
    #[validate(length(min = 1, max = 200, message = "English title must be 1-200 characters"))]
    pub en: String,

    #[validate(length(min = 1, max = 200, message = "French title must be 1-200 characters"))]
    pub fr: String,
}

impl LocalizedTitle {
    fn trimmed(self) -> Self {
        Self {
            en: self.en.trim().to_string(),
            fr: self.fr.trim().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct News {
    pub title: LocalizedTitle,

    pub content: String,

    pub status: NewsStatus,

    pub category: NewsCategory,

    #[serde(default)]
    pub image: Option<String>,

    #[serde(default)]
    pub author: Option<String>,
}

impl Entity for News {
    const COLLECTION: &'static str = "news";
    const SEARCH_FIELDS: &'static [&'static str] = &["title.en", "title.fr", "content"];
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateNews {
    pub title: LocalizedTitle,

    #[validate(length(min = 1, message = "Content is required"))]
    pub content: String,

    pub status: NewsStatus,

    pub category: NewsCategory,

    #[validate(length(max = 512, message = "Image path must be at most 512 characters"))]
    pub image: Option<String>,

    #[validate(length(max = 100, message = "Author must be at most 100 characters"))]
    pub author: Option<String>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateNews {
    pub title: Option<LocalizedTitle>,

    #[validate(length(min = 1, message = "Content must not be empty"))]
    pub content: Option<String>,

    pub status: Option<NewsStatus>,

    pub category: Option<NewsCategory>,

    #[validate(length(max = 512, message = "Image path must be at most 512 characters"))]
    pub image: Option<String>,

    #[validate(length(max = 100, message = "Author must be at most 100 characters"))]
    pub author: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct NewsFilter {
    pub status: Option<NewsStatus>,
    pub category: Option<NewsCategory>,
}

impl Resource for News {
    const LABEL: &'static str = "News";

    type Create = CreateNews;
    type Update = UpdateNews;
    type Filter = NewsFilter;

    fn from_create(input: CreateNews) -> Result<Self, Vec<FieldError>> {
        Ok(Self {
            title: input.title.trimmed(),
            content: input.content,
            status: input.status,
            category: input.category,
            image: clean_opt(input.image),
            author: clean_opt(input.author),
        })
    }

    fn apply_update(&mut self, input: UpdateNews) {
        if let Some(title) = input.title {
            self.title = title.trimmed();
        }
        if let Some(content) = input.content {
            self.content = content;
        }
        if let Some(status) = input.status {
            self.status = status;
        }
        if let Some(category) = input.category {
            self.category = category;
        }
        if input.image.is_some() {
            self.image = clean_opt(input.image);
        }
        if input.author.is_some() {
            self.author = clean_opt(input.author);
        }
    }

    fn check(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = match self.title.validate() {
            Ok(()) => Vec::new(),
            Err(errors) => prefixed_field_errors(&errors, "title"),
        };
        errors.extend(require_text("content", &self.content, 1, "Content is required"));

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
