/// Document versions
///
/// ```text
/// POST /documents/:id/versions
/// Content-Type: multipart/form-data
///
/// file=<binary>, changes="Fixed the proof of Lemma 3"
/// ```
///
/// The upload becomes version n+1 and the document's current file.

use super::resource::not_found;
use super::uploads::{discard, document_type, receive, Received};
use crate::{
    error::ApiResult,
    extract::ResourceId,
    response::Envelope,
    uploads::{UploadStore, DOCUMENTS},
};
use axum::extract::{multipart::MultipartRejection, Multipart, State};
use mathcms_shared::{
    models::document::Document,
    services::{crud::CrudService, documents::NewVersion},
    store::Record,
};

pub async fn add_version(
    State(documents): State<CrudService<Document>>,
    State(uploads): State<UploadStore>,
    ResourceId(id): ResourceId,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Envelope<Record<Document>>> {
    documents.require(id).await?;

    let Received { file, changes } = receive(&uploads, multipart, DOCUMENTS).await?;
    let file_type = document_type(&file).await?;

    let version = NewVersion {
        file_url: file.url.clone(),
        file_size: file.size,
        file_type,
        changes,
    };

    let saved = match documents.add_version(id, version).await {
        Ok(Some(record)) => record,
        Ok(None) => {
            discard(Some(&file)).await;
            return Err(not_found::<Document>());
        }
        Err(err) => {
            discard(Some(&file)).await;
            return Err(err.into());
        }
    };

    let number = saved.data.versions.last().map(|v| v.version).unwrap_or_default();
    Ok(Envelope::ok(saved).with_message(format!("Version {} added", number)))
}
