/// Typed HTTP client for the API
///
/// Every helper sends JSON, attaches the bearer token when one is set and
/// decodes the success envelope. Non-2xx answers become
/// [`ClientError::Api`] carrying the server's message and field errors.
///
/// # Example
///
/// ```no_run
/// use mathcms_api::client::ApiClient;
/// use mathcms_shared::{models::news::News, store::Record};
///
/// # async fn example() -> Result<(), mathcms_api::client::ClientError> {
/// let mut client = ApiClient::new("http://localhost:8080");
/// client.login("admin@math.example.org", "bootstrap99").await?;
///
/// let news = client.get::<Vec<Record<News>>>("/news?status=published").await?;
/// println!("{} published items", news.data.len());
/// # Ok(())
/// # }
/// ```

use crate::response::{Envelope, ErrorBody};
use mathcms_shared::services::users::Session;
use mathcms_shared::validation::FieldError;
use reqwest::{Method, RequestBuilder};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::json;
use tracing::debug;

const FALLBACK_MESSAGE: &str = "Request failed";

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The server answered with a failure status
    #[error("{message} (HTTP {status})")]
    Api {
        status: u16,
        message: String,
        errors: Vec<FieldError>,
    },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ClientError {
    /// HTTP status of an API failure
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn clear_token(&mut self) {
        self.token = None;
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<Envelope<T>, ClientError> {
        self.send(self.request(Method::GET, path)).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<Envelope<T>, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(self.request(Method::POST, path).json(body)).await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<Envelope<T>, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(self.request(Method::PUT, path).json(body)).await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<Envelope<T>, ClientError> {
        self.send(self.request(Method::DELETE, path)).await
    }

    /// Logs in and keeps the returned token for later requests
    pub async fn login(&mut self, email: &str, password: &str) -> Result<Session, ClientError> {
        let envelope: Envelope<Session> = self
            .post("/auth/login", &json!({ "email": email, "password": password }))
            .await?;

        self.token = Some(envelope.data.token.clone());
        Ok(envelope.data)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let builder = self.http.request(method, url);

        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<Envelope<T>, ClientError> {
        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        debug!(status = status.as_u16(), bytes = bytes.len(), "API response");

        if status.is_success() {
            return Ok(serde_json::from_slice(&bytes)?);
        }

        let (message, errors) = match serde_json::from_slice::<ErrorBody>(&bytes) {
            Ok(body) => (body.message, body.errors.unwrap_or_default()),
            Err(_) => (FALLBACK_MESSAGE.to_string(), Vec::new()),
        };

        Err(ClientError::Api {
            status: status.as_u16(),
            message,
            errors,
        })
    }
}
