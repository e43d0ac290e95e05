/// Generic CRUD routes
///
/// One set of handlers serves every collection. Each handler is generic
/// over the [`Resource`] and pulls the matching [`CrudService`] out of the
/// application state.
///
/// # Endpoints
///
/// ```text
/// GET    /            list, with entity filters and ?limit=&offset=
/// GET    /search?q=   case-insensitive search
/// GET    /:id
/// POST   /            201 with the created document
/// PUT    /:id         partial update
/// DELETE /:id
/// ```

use super::guard;
use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{JsonBody, Paging, QueryParams, ResourceId, SearchQuery},
    middleware::gate::{require_auth, Gate},
    response::{Created, Envelope},
};
use axum::{
    extract::{FromRef, State},
    middleware::from_fn_with_state,
    routing::{get, post, put},
    Router,
};
use mathcms_shared::{models::Resource, services::crud::CrudService, store::Record};
use serde::Serialize;
use uuid::Uuid;

/// Who may read a collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Reads are public, writes need a token
    PublicReads,

    /// Every verb needs a token
    Private,
}

/// Body of a delete response
#[derive(Debug, Serialize)]
pub struct Deleted {
    pub id: Uuid,
}

pub async fn list<T>(
    State(service): State<CrudService<T>>,
    QueryParams(paging): QueryParams<Paging>,
    QueryParams(filter): QueryParams<T::Filter>,
) -> ApiResult<Envelope<Vec<Record<T>>>>
where
    T: Resource,
{
    let records = service
        .get_all(&filter, paging.limit(), paging.offset())
        .await?;
    Ok(Envelope::list(records))
}

pub async fn search<T>(
    State(service): State<CrudService<T>>,
    QueryParams(query): QueryParams<SearchQuery>,
) -> ApiResult<Envelope<Vec<Record<T>>>>
where
    T: Resource,
{
    let records = service.search(&query.q).await?;
    Ok(Envelope::list(records))
}

pub async fn get_one<T>(
    State(service): State<CrudService<T>>,
    ResourceId(id): ResourceId,
) -> ApiResult<Envelope<Record<T>>>
where
    T: Resource,
{
    let record = service.require(id).await?;
    Ok(Envelope::ok(record))
}

pub async fn create<T>(
    State(service): State<CrudService<T>>,
    JsonBody(input): JsonBody<T::Create>,
) -> ApiResult<Created<Record<T>>>
where
    T: Resource,
{
    let record = service.create(input).await?;
    Ok(Created(
        Envelope::ok(record).with_message(format!("{} created", T::LABEL)),
    ))
}

pub async fn update<T>(
    State(service): State<CrudService<T>>,
    ResourceId(id): ResourceId,
    JsonBody(input): JsonBody<T::Update>,
) -> ApiResult<Envelope<Record<T>>>
where
    T: Resource,
{
    let record = service
        .update(id, input)
        .await?
        .ok_or_else(|| not_found::<T>())?;
    Ok(Envelope::ok(record).with_message(format!("{} updated", T::LABEL)))
}

pub async fn remove<T>(
    State(service): State<CrudService<T>>,
    ResourceId(id): ResourceId,
) -> ApiResult<Envelope<Deleted>>
where
    T: Resource,
{
    if !service.delete(id).await? {
        return Err(not_found::<T>());
    }
    Ok(Envelope::ok(Deleted { id }).with_message(format!("{} deleted", T::LABEL)))
}

pub(crate) fn not_found<T: Resource>() -> ApiError {
    ApiError::NotFound(format!("{} not found", T::LABEL))
}

/// The six standard routes for `T`
pub fn router<T>(gate: &Gate, access: Access) -> Router<AppState>
where
    T: Resource,
    CrudService<T>: FromRef<AppState>,
{
    match access {
        Access::PublicReads => Router::new()
            .route("/", get(list::<T>).merge(guard(post(create::<T>), gate)))
            .route("/search", get(search::<T>))
            .route(
                "/:id",
                get(get_one::<T>).merge(guard(put(update::<T>).delete(remove::<T>), gate)),
            ),
        Access::Private => Router::new()
            .route("/", get(list::<T>).post(create::<T>))
            .route("/search", get(search::<T>))
            .route(
                "/:id",
                get(get_one::<T>).put(update::<T>).delete(remove::<T>),
            )
            .route_layer(from_fn_with_state(gate.clone(), require_auth)),
    }
}
