/// Error handling and HTTP response mapping
///
/// [`ApiError`] is the only error type handlers return. Service, token and
/// upload errors convert into it, and it renders the failure envelope.
///
/// # Status Codes
///
/// - `400 Bad Request`: validation failure, malformed JSON or id
/// - `401 Unauthorized`: missing or invalid token, failed login
/// - `403 Forbidden`: role does not allow the operation
/// - `404 Not Found`: unknown id
/// - `409 Conflict`: unique field already in use
/// - `413 Payload Too Large`: upload over its size limit
/// - `500 Internal Server Error`: anything else (details are logged only)

use crate::response::ErrorBody;
use crate::uploads::UploadError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use mathcms_shared::auth::jwt::JwtError;
use mathcms_shared::services::ServiceError;
use mathcms_shared::validation::FieldError;
use std::fmt;

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),

    ValidationError(Vec<FieldError>),

    Unauthorized(String),

    Forbidden(String),

    NotFound(String),

    Conflict(String),

    PayloadTooLarge(String),

    /// Logged, never shown to the client
    InternalError(String),
}

impl ApiError {
    pub fn invalid_body(message: impl Into<String>) -> Self {
        ApiError::ValidationError(vec![FieldError::new("body", message)])
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::ValidationError(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::PayloadTooLarge(msg) => write!(f, "Payload too large: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let (message, errors) = match self {
            ApiError::ValidationError(errors) => ("Validation failed".to_string(), Some(errors)),
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                ("An internal error occurred".to_string(), None)
            }
            ApiError::BadRequest(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::Conflict(msg)
            | ApiError::PayloadTooLarge(msg) => (msg, None),
        };

        let body = Json(ErrorBody {
            success: false,
            message,
            errors,
        });

        (status, body).into_response()
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Validation(errors) => ApiError::ValidationError(errors),
            ServiceError::NotFound(label) => ApiError::NotFound(format!("{} not found", label)),
            ServiceError::Conflict { field } => {
                ApiError::Conflict(format!("{} is already in use", field))
            }
            ServiceError::InvalidCredentials => {
                ApiError::Unauthorized("Invalid email or password".to_string())
            }
            other => ApiError::InternalError(other.to_string()),
        }
    }
}

impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => ApiError::Unauthorized("Token expired".to_string()),
            JwtError::InvalidIssuer { .. } => {
                ApiError::Unauthorized("Invalid token issuer".to_string())
            }
            JwtError::CreateError(msg) => ApiError::InternalError(msg),
            JwtError::ValidationError(_) => ApiError::Unauthorized("Invalid token".to_string()),
        }
    }
}

impl From<UploadError> for ApiError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::TooLarge { .. } => ApiError::PayloadTooLarge(err.to_string()),
            UploadError::Io(_) => ApiError::InternalError(err.to_string()),
            UploadError::MissingFile | UploadError::UnsupportedType(_) | UploadError::Multipart(_) => {
                ApiError::ValidationError(vec![FieldError::new("file", err.to_string())])
            }
        }
    }
}
