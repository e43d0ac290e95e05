/// Document version uploads

use super::crud::CrudService;
use super::ServiceResult;
use crate::models::document::{Document, FileType};
use crate::store::Record;
use tracing::info;
use uuid::Uuid;

/// A stored file to attach as the next version
#[derive(Debug, Clone)]
pub struct NewVersion {
    pub file_url: String,
    pub file_size: u64,
    pub file_type: FileType,
    pub changes: Option<String>,
}

impl CrudService<Document> {
    /// Appends version n+1 and makes it the current file; `Ok(None)` for an unknown id
    pub async fn add_version(
        &self,
        id: Uuid,
        version: NewVersion,
    ) -> ServiceResult<Option<Record<Document>>> {
        let Some(mut record) = self.get_by_id(id).await? else {
            return Ok(None);
        };

        let number = record
            .data
            .push_version(
                version.file_url,
                version.file_size,
                version.file_type,
                version.changes,
            )
            .version;

        let saved = self.save(id, record.data).await?;
        if saved.is_some() {
            info!(document_id = %id, version = number, "Added document version");
        }
        Ok(saved)
    }
}
