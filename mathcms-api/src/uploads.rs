/// File uploads
///
/// Files arrive as multipart fields and are streamed to disk under the
/// upload root, one subdirectory per kind:
///
/// ```text
/// <upload_root>/
/// ├── documents/   # papers, notes, slides (50 MB)
/// └── images/      # avatars, news images (10 MB)
/// ```
///
/// Stored names are `<unix-millis>-<random>.<ext>`; the client's filename is
/// reported back but never used on disk. A file that exceeds its limit is
/// deleted before the error is returned.

use axum::extract::multipart::{Field, MultipartError};
use axum::http::StatusCode;
use chrono::Utc;
use rand::Rng;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

const MB: u64 = 1024 * 1024;

/// Public URL prefix of the upload root
pub const PUBLIC_PREFIX: &str = "/uploads";

/// What a field may contain and where it is stored
#[derive(Debug, Clone, Copy)]
pub struct UploadPolicy {
    /// Subdirectory of the upload root
    pub dir: &'static str,

    pub max_bytes: u64,

    /// Accepted MIME types and the extension stored for each
    pub types: &'static [(&'static str, &'static str)],
}

pub const DOCUMENTS: UploadPolicy = UploadPolicy {
    dir: "documents",
    max_bytes: 50 * MB,
    types: &[
        ("application/pdf", "pdf"),
        ("application/msword", "doc"),
        (
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
            "docx",
        ),
        ("application/x-tex", "tex"),
        ("application/x-latex", "tex"),
        ("text/x-tex", "tex"),
        ("text/markdown", "md"),
        ("text/x-markdown", "md"),
    ],
};

pub const IMAGES: UploadPolicy = UploadPolicy {
    dir: "images",
    max_bytes: 10 * MB,
    types: &[
        ("image/jpeg", "jpg"),
        ("image/png", "png"),
        ("image/gif", "gif"),
        ("image/webp", "webp"),
    ],
};

impl UploadPolicy {
    pub fn extension_for(&self, mime: &str) -> Option<&'static str> {
        self.types
            .iter()
            .find(|(accepted, _)| *accepted == mime)
            .map(|(_, ext)| *ext)
    }

    /// Request body cap for routes accepting this kind; leaves room for
    /// multipart framing and small text fields
    pub fn body_limit(&self) -> usize {
        (self.max_bytes + MB) as usize
    }
}

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("No file was uploaded")]
    MissingFile,

    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),

    #[error("File exceeds the {} MB limit", .limit / MB)]
    TooLarge { limit: u64 },

    #[error("Malformed upload: {0}")]
    Multipart(String),

    #[error("Failed to store upload: {0}")]
    Io(#[from] std::io::Error),
}

impl UploadError {
    pub(crate) fn from_multipart(err: MultipartError, limit: u64) -> Self {
        if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
            UploadError::TooLarge { limit }
        } else {
            UploadError::Multipart(err.body_text())
        }
    }
}

/// Metadata of a stored file
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredFile {
    /// Public URL, e.g. `/uploads/images/1718000000000-482913.png`
    pub url: String,

    pub filename: String,

    pub original_name: Option<String>,

    pub mime_type: String,

    pub size: u64,

    #[serde(skip)]
    pub path: PathBuf,
}

/// Writes uploads below a root directory
#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
}

impl UploadStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn random_name(ext: &str) -> String {
        let suffix: u32 = rand::thread_rng().gen_range(100_000_000..1_000_000_000);
        format!("{}-{}.{}", Utc::now().timestamp_millis(), suffix, ext)
    }

    /// Streams one multipart field to disk under `policy`
    pub async fn save(&self, mut field: Field<'_>, policy: UploadPolicy) -> Result<StoredFile, UploadError> {
        let mime = field
            .content_type()
            .and_then(|m| m.split(';').next())
            .map(|m| m.trim().to_ascii_lowercase())
            .unwrap_or_default();
        let ext = policy
            .extension_for(&mime)
            .ok_or_else(|| UploadError::UnsupportedType(mime.clone()))?;
        let original_name = field.file_name().map(str::to_string);

        let dir = self.root.join(policy.dir);
        fs::create_dir_all(&dir).await?;

        let filename = Self::random_name(ext);
        let path = dir.join(&filename);

        let written = Self::write_capped(&mut field, &path, policy.max_bytes).await;
        let size = match written {
            Ok(size) => size,
            Err(err) => {
                if let Err(remove_err) = fs::remove_file(&path).await {
                    warn!(path = %path.display(), error = %remove_err, "Failed to remove partial upload");
                }
                debug!(path = %path.display(), error = %err, "Discarded upload");
                return Err(err);
            }
        };

        info!(kind = policy.dir, filename = %filename, size, "Stored upload");

        Ok(StoredFile {
            url: format!("{}/{}/{}", PUBLIC_PREFIX, policy.dir, filename),
            filename,
            original_name,
            mime_type: mime,
            size,
            path,
        })
    }

    async fn write_capped(field: &mut Field<'_>, path: &Path, limit: u64) -> Result<u64, UploadError> {
        let mut file = File::create(path).await?;
        let mut size: u64 = 0;

        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| UploadError::from_multipart(e, limit))?
        {
            size += chunk.len() as u64;
            if size > limit {
                return Err(UploadError::TooLarge { limit });
            }
            file.write_all(&chunk).await?;
        }

        file.flush().await?;
        Ok(size)
    }
}
