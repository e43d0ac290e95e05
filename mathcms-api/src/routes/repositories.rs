/// Repository reads with the owner populated
///
/// Writes and search go through the generic handlers; reads replace them
/// so every repository carries `ownerProfile` (`null` when the owner id
/// no longer resolves).
///
/// - `GET /repositories`: filters `owner`, `isPublic`
/// - `GET /repositories/:id`
/// - `GET /repositories/owner/:researcherId`
/// - `PUT /repositories/:id/visibility`: `{ "isPublic": false }`

use super::resource::not_found;
use crate::{
    error::{ApiError, ApiResult},
    extract::{JsonBody, Paging, QueryParams, ResourceId},
    response::Envelope,
};
use axum::extract::State;
use mathcms_shared::{
    models::repository::{Repository, RepositoryFilter, SetVisibility},
    services::repositories::{PopulatedRepository, RepositoryService},
    validation::required,
};

pub async fn list(
    State(repositories): State<RepositoryService>,
    QueryParams(paging): QueryParams<Paging>,
    QueryParams(filter): QueryParams<RepositoryFilter>,
) -> ApiResult<Envelope<Vec<PopulatedRepository>>> {
    let found = repositories
        .get_all(&filter, paging.limit(), paging.offset())
        .await?;
    Ok(Envelope::list(found))
}

pub async fn get_one(
    State(repositories): State<RepositoryService>,
    ResourceId(id): ResourceId,
) -> ApiResult<Envelope<PopulatedRepository>> {
    let found = repositories
        .get_by_id(id)
        .await?
        .ok_or_else(not_found::<Repository>)?;
    Ok(Envelope::ok(found))
}

pub async fn by_owner(
    State(repositories): State<RepositoryService>,
    ResourceId(researcher_id): ResourceId,
) -> ApiResult<Envelope<Vec<PopulatedRepository>>> {
    Ok(Envelope::list(repositories.by_owner(researcher_id).await?))
}

pub async fn set_visibility(
    State(repositories): State<RepositoryService>,
    ResourceId(id): ResourceId,
    JsonBody(input): JsonBody<SetVisibility>,
) -> ApiResult<Envelope<PopulatedRepository>> {
    let is_public = required(input.is_public, "isPublic").map_err(ApiError::ValidationError)?;

    let updated = repositories
        .set_visibility(id, is_public)
        .await?
        .ok_or_else(not_found::<Repository>)?;

    let message = if is_public {
        "Repository is now public"
    } else {
        "Repository is now private"
    };
    Ok(Envelope::ok(updated).with_message(message))
}
