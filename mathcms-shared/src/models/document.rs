/// Research documents
///
/// A document describes a research artifact and the file that holds it.
/// Every uploaded file is appended to `versions`; `fileUrl`, `fileSize` and
/// `fileType` always describe the latest one.

use super::{clean_list, clean_opt, Resource};
use crate::store::Entity;
use crate::validation::{require_text, required, validate_no_blank_entries, FieldError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileType {
    Pdf,
    Doc,
    Docx,
    Latex,
    Markdown,
}

impl FileType {
    /// Maps an accepted upload MIME type to its file type
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            "application/pdf" => Some(FileType::Pdf),
            "application/msword" => Some(FileType::Doc),
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => {
                Some(FileType::Docx)
            }
            "application/x-tex" | "application/x-latex" | "text/x-tex" => Some(FileType::Latex),
            "text/markdown" | "text/x-markdown" => Some(FileType::Markdown),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentCategory {
    Article,
    Preprint,
    Thesis,
    Report,
    LectureNotes,
    Presentation,
    #[default]
    Other,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublicationStatus {
    #[default]
    Draft,
    UnderReview,
    Published,
    Archived,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    #[default]
    Public,
    Private,
    Restricted,
}

/// One uploaded revision of the document's file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentVersion {
    pub version: u32,
    pub file_url: String,
    pub file_size: u64,
    pub uploaded_at: DateTime<Utc>,
    #[serde(default)]
    pub changes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub title: String,

    #[serde(rename = "abstract", default)]
    pub summary: Option<String>,

    pub authors: Vec<String>,

    pub file_type: FileType,

    pub category: DocumentCategory,

    #[serde(default)]
    pub tags: Vec<String>,

    pub status: PublicationStatus,

    pub visibility: Visibility,

    #[serde(default)]
    pub versions: Vec<DocumentVersion>,

    #[serde(default)]
    pub file_url: Option<String>,

    #[serde(default)]
    pub file_size: Option<u64>,

    /// Repository the document belongs to (not enforced)
    #[serde(default)]
    pub repository: Option<Uuid>,
}

impl Document {
    /// Appends a version for a newly uploaded file and makes it current
    pub fn push_version(
        &mut self,
        file_url: String,
        file_size: u64,
        file_type: FileType,
        changes: Option<String>,
    ) -> &DocumentVersion {
        let next = self.versions.iter().map(|v| v.version).max().unwrap_or(0) + 1;

        self.file_url = Some(file_url.clone());
        self.file_size = Some(file_size);
        self.file_type = file_type;
        self.versions.push(DocumentVersion {
            version: next,
            file_url,
            file_size,
            uploaded_at: Utc::now(),
            changes: clean_opt(changes),
        });

        &self.versions[self.versions.len() - 1]
    }
}

impl Entity for Document {
    const COLLECTION: &'static str = "documents";
    const SEARCH_FIELDS: &'static [&'static str] = &["title", "abstract", "authors", "tags"];
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateDocument {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: String,

    #[serde(rename = "abstract")]
    #[validate(length(max = 5000, message = "Abstract must be at most 5000 characters"))]
    pub summary: Option<String>,

    #[validate(
        length(min = 1, message = "At least one author is required"),
        custom(function = "validate_no_blank_entries")
    )]
    pub authors: Vec<String>,

    #[validate(required(message = "File type is required"))]
    pub file_type: Option<FileType>,

    pub category: DocumentCategory,

    pub tags: Vec<String>,

    pub status: PublicationStatus,

    pub visibility: Visibility,

    #[validate(length(max = 512, message = "File URL must be at most 512 characters"))]
    pub file_url: Option<String>,

    pub file_size: Option<u64>,

    pub repository: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateDocument {
    #[validate(length(min = 1, max = 200, message = "Title must be 1-200 characters"))]
    pub title: Option<String>,

    #[serde(rename = "abstract")]
    #[validate(length(max = 5000, message = "Abstract must be at most 5000 characters"))]
    pub summary: Option<String>,

    #[validate(
        length(min = 1, message = "At least one author is required"),
        custom(function = "validate_no_blank_entries")
    )]
    pub authors: Option<Vec<String>>,

    pub category: Option<DocumentCategory>,

    pub tags: Option<Vec<String>>,

    pub status: Option<PublicationStatus>,

    pub visibility: Option<Visibility>,

    pub repository: Option<Uuid>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentFilter {
    pub status: Option<PublicationStatus>,
    pub visibility: Option<Visibility>,
    pub file_type: Option<FileType>,
    pub category: Option<DocumentCategory>,
    pub repository: Option<Uuid>,
    /// Documents carrying this tag
    pub tag: Option<String>,
}

impl Resource for Document {
    const LABEL: &'static str = "Document";

    type Create = CreateDocument;
    type Update = UpdateDocument;
    type Filter = DocumentFilter;

    fn from_create(input: CreateDocument) -> Result<Self, Vec<FieldError>> {
        let mut document = Self {
            title: input.title.trim().to_string(),
            summary: clean_opt(input.summary),
            authors: clean_list(input.authors),
            file_type: required(input.file_type, "fileType")?,
            category: input.category,
            tags: clean_list(input.tags),
            status: input.status,
            visibility: input.visibility,
            versions: Vec::new(),
            file_url: None,
            file_size: None,
            repository: input.repository,
        };

        if let Some(url) = clean_opt(input.file_url) {
            let file_type = document.file_type;
            document.push_version(url, input.file_size.unwrap_or(0), file_type, None);
        }

        Ok(document)
    }

    fn apply_update(&mut self, input: UpdateDocument) {
        if let Some(title) = input.title {
            self.title = title.trim().to_string();
        }
        if input.summary.is_some() {
            self.summary = clean_opt(input.summary);
        }
        if let Some(authors) = input.authors {
            self.authors = clean_list(authors);
        }
        if let Some(category) = input.category {
            self.category = category;
        }
        if let Some(tags) = input.tags {
            self.tags = clean_list(tags);
        }
        if let Some(status) = input.status {
            self.status = status;
        }
        if let Some(visibility) = input.visibility {
            self.visibility = visibility;
        }
        if input.repository.is_some() {
            self.repository = input.repository;
        }
    }

    fn check(&self) -> Result<(), Vec<FieldError>> {
        match require_text("title", &self.title, 1, "Title must be 1-200 characters") {
            Some(error) => Err(vec![error]),
            None => Ok(()),
        }
    }

    fn filter_document(filter: &DocumentFilter) -> Map<String, Value> {
        let mut map = Map::new();
        let mut put = |key: &str, value: Option<Value>| {
            if let Some(value) = value {
                map.insert(key.to_string(), value);
            }
        };

        put("status", filter.status.and_then(|v| serde_json::to_value(v).ok()));
        put("visibility", filter.visibility.and_then(|v| serde_json::to_value(v).ok()));
        put("fileType", filter.file_type.and_then(|v| serde_json::to_value(v).ok()));
        put("category", filter.category.and_then(|v| serde_json::to_value(v).ok()));
        put("repository", filter.repository.map(|id| Value::String(id.to_string())));
        put(
            "tags",
            filter
                .tag
                .as_ref()
                .map(|tag| Value::Array(vec![Value::String(tag.trim().to_string())])),
        );

        map
    }
}
