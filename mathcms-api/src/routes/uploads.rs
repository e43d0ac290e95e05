/// Multipart intake
///
/// Upload routes accept `multipart/form-data` with the file in a field
/// named `file`. Version uploads may add a text field `changes`. Other
/// fields are ignored.
///
/// - `POST /documents/upload`: a document file, answered with its metadata
/// - `POST /uploads/images`: an image, answered with its metadata

use crate::{
    error::ApiResult,
    response::{Created, Envelope},
    uploads::{StoredFile, UploadError, UploadPolicy, UploadStore, DOCUMENTS, IMAGES},
};
use axum::extract::{multipart::MultipartRejection, Multipart, State};
use mathcms_shared::models::document::FileType;
use serde::Serialize;
use tracing::warn;

/// What a multipart request carried
#[derive(Debug)]
pub struct Received {
    pub file: StoredFile,
    pub changes: Option<String>,
}

/// Stores the `file` field under `policy` and collects `changes`
pub async fn receive(
    uploads: &UploadStore,
    multipart: Result<Multipart, MultipartRejection>,
    policy: UploadPolicy,
) -> Result<Received, UploadError> {
    let mut multipart = multipart.map_err(|rejection| UploadError::Multipart(rejection.body_text()))?;

    let mut file = None;
    let mut changes = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(err) => {
                discard(file.as_ref()).await;
                return Err(UploadError::from_multipart(err, policy.max_bytes));
            }
        };

        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") if file.is_none() => {
                file = Some(uploads.save(field, policy).await?);
            }
            Some("changes") => {
                let text = match field.text().await {
                    Ok(text) => text,
                    Err(err) => {
                        discard(file.as_ref()).await;
                        return Err(UploadError::from_multipart(err, policy.max_bytes));
                    }
                };
                let text = text.trim();
                if !text.is_empty() {
                    changes = Some(text.to_string());
                }
            }
            _ => {}
        }
    }

    let file = file.ok_or(UploadError::MissingFile)?;
    Ok(Received { file, changes })
}

/// Removes a stored file whose request failed later on
pub async fn discard(file: Option<&StoredFile>) {
    if let Some(file) = file {
        if let Err(err) = tokio::fs::remove_file(&file.path).await {
            warn!(path = %file.path.display(), error = %err, "Failed to remove orphaned upload");
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedDocument {
    #[serde(flatten)]
    pub file: StoredFile,

    pub file_type: FileType,
}

pub async fn upload_document(
    State(uploads): State<UploadStore>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Created<UploadedDocument>> {
    let Received { file, .. } = receive(&uploads, multipart, DOCUMENTS).await?;
    let file_type = document_type(&file).await?;

    Ok(Created(
        Envelope::ok(UploadedDocument { file, file_type }).with_message("File uploaded"),
    ))
}

pub async fn upload_image(
    State(uploads): State<UploadStore>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Created<StoredFile>> {
    let Received { file, .. } = receive(&uploads, multipart, IMAGES).await?;
    Ok(Created(Envelope::ok(file).with_message("Image uploaded")))
}

/// File type of a stored document upload
pub(crate) async fn document_type(file: &StoredFile) -> Result<FileType, UploadError> {
    match FileType::from_mime(&file.mime_type) {
        Some(file_type) => Ok(file_type),
        None => {
            discard(Some(file)).await;
            Err(UploadError::UnsupportedType(file.mime_type.clone()))
        }
    }
}
