/// Researcher extras
///
/// - `GET /researchers/leaderboard`: everyone ranked by contributions (public)
/// - `POST /researchers/:id/avatar`: multipart image upload that replaces the avatar

use super::resource::not_found;
use super::uploads::{discard, receive, Received};
use crate::{
    error::ApiResult,
    extract::ResourceId,
    response::Envelope,
    uploads::{UploadStore, IMAGES},
};
use axum::extract::{multipart::MultipartRejection, Multipart, State};
use mathcms_shared::{
    models::researcher::Researcher,
    services::{crud::CrudService, researchers::LeaderboardEntry},
    store::Record,
};

pub async fn leaderboard(
    State(researchers): State<CrudService<Researcher>>,
) -> ApiResult<Envelope<Vec<LeaderboardEntry>>> {
    Ok(Envelope::list(researchers.leaderboard().await?))
}

pub async fn upload_avatar(
    State(researchers): State<CrudService<Researcher>>,
    State(uploads): State<UploadStore>,
    ResourceId(id): ResourceId,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Envelope<Record<Researcher>>> {
    researchers.require(id).await?;

    let Received { file, .. } = receive(&uploads, multipart, IMAGES).await?;

    let saved = match researchers.set_avatar(id, file.url.clone()).await {
        Ok(Some(record)) => record,
        Ok(None) => {
            discard(Some(&file)).await;
            return Err(not_found::<Researcher>());
        }
        Err(err) => {
            discard(Some(&file)).await;
            return Err(err.into());
        }
    };

    Ok(Envelope::ok(saved).with_message("Avatar updated"))
}
