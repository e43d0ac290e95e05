/// Business logic over the document store
///
/// - [`crud`]: the generic create/read/update/delete/search service
/// - [`documents`]: document version uploads
/// - [`repositories`]: owner population and visibility
/// - [`researchers`]: leaderboard and avatar updates
/// - [`dashboard`]: admin statistics
/// - [`users`]: login, registration and the bootstrap admin

pub mod crud;
pub mod dashboard;
pub mod documents;
pub mod repositories;
pub mod researchers;
pub mod users;

use crate::auth::jwt::JwtError;
use crate::auth::password::PasswordError;
use crate::store::StoreError;
use crate::validation::FieldError;

/// Errors returned by every service
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Payload failed field or cross-field rules
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    /// Carries the entity label
    #[error("{0} not found")]
    NotFound(&'static str),

    /// A unique field already holds this value
    #[error("{field} is already in use")]
    Conflict { field: String },

    /// Login failed; the message does not say which credential was wrong
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error(transparent)]
    Store(StoreError),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Jwt(#[from] JwtError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl From<StoreError> for ServiceError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Conflict {
                collection,
                constraint,
            } => ServiceError::Conflict {
                field: conflict_field(collection, &constraint),
            },
            other => ServiceError::Store(other),
        }
    }
}

impl ServiceError {
    pub fn validation(field: &str, message: &str) -> Self {
        ServiceError::Validation(vec![FieldError::new(field, message)])
    }
}

/// `researchers_email_key` on `researchers` → `email`
fn conflict_field(collection: &str, constraint: &str) -> String {
    let trimmed = constraint
        .strip_prefix(collection)
        .and_then(|rest| rest.strip_prefix('_'))
        .unwrap_or(constraint);
    trimmed.strip_suffix("_key").unwrap_or(trimmed).to_string()
}
