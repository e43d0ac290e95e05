/// Request extractors with API-shaped rejections
///
/// axum's own extractors reject with plain-text bodies. These wrappers
/// answer with the failure envelope instead:
///
/// - [`JsonBody`]: malformed JSON or unknown enum values become a `400`
///   validation error on field `body`
/// - [`ResourceId`]: a path id that is not a UUID becomes `400 Invalid id`
/// - [`QueryParams`]: unparseable query strings become `400`

use crate::error::ApiError;
use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::request::Parts,
    Json,
};
use serde::{de::DeserializeOwned, Deserialize};
use uuid::Uuid;

pub struct JsonBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => Err(ApiError::invalid_body(rejection.body_text())),
        }
    }
}

/// The single `:id` segment of a route
#[derive(Debug, Clone, Copy)]
pub struct ResourceId(pub Uuid);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for ResourceId {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<Uuid>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::BadRequest("Invalid id".to_string()))?;
        Ok(Self(id))
    }
}

pub struct QueryParams<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for QueryParams<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Query::<T>::from_request_parts(parts, state).await {
            Ok(Query(value)) => Ok(Self(value)),
            Err(rejection) => Err(ApiError::BadRequest(rejection.body_text())),
        }
    }
}

/// `?limit=&offset=` on list endpoints
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Paging {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl Paging {
    pub fn limit(&self) -> Option<i64> {
        self.limit.map(i64::from)
    }

    pub fn offset(&self) -> Option<i64> {
        self.offset.map(i64::from)
    }
}

/// `?q=` on search endpoints
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::StatusCode, response::IntoResponse, routing::get, Router};
    use tower::ServiceExt;

    async fn echo_id(ResourceId(id): ResourceId) -> String {
        id.to_string()
    }

    async fn echo_paging(QueryParams(paging): QueryParams<Paging>) -> String {
        format!("{:?}/{:?}", paging.limit(), paging.offset())
    }

    async fn call(app: Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(
                axum::http::Request::builder()
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
            .into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_resource_id() {
        let app = Router::new().route("/:id", get(echo_id));
        let id = Uuid::new_v4();

        let (status, body) = call(app.clone(), &format!("/{}", id)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, id.to_string());

        let (status, body) = call(app, "/not-a-uuid").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("Invalid id"));
    }

    #[tokio::test]
    async fn test_paging() {
        let app = Router::new().route("/", get(echo_paging));

        let (status, body) = call(app.clone(), "/?limit=5&offset=10").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "Some(5)/Some(10)");

        let (status, _) = call(app, "/?limit=-1").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
