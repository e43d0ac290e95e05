/// Authentication endpoints
///
/// - `POST /auth/login`: exchange credentials for `{ token, user }`
/// - `POST /auth/register`: create an admin panel account (admin only)
/// - `GET /auth/me`: the caller's profile (any valid token)
///
/// # Example
///
/// ```text
/// POST /auth/login
/// Content-Type: application/json
///
/// { "email": "admin@math.example.org", "password": "..." }
/// ```
///
/// ```json
/// { "success": true, "data": { "token": "eyJ...", "user": { "id": "...", "role": "admin" } }, "message": "Login successful" }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: malformed payload or weak password on register
/// - `401 Unauthorized`: wrong email or password
/// - `409 Conflict`: email already registered

use crate::{
    error::{ApiError, ApiResult},
    extract::JsonBody,
    response::{Created, Envelope},
};
use axum::{extract::State, Extension};
use mathcms_shared::{
    auth::AuthContext,
    models::user::{LoginUser, RegisterUser, UserProfile},
    services::users::{Session, UserService},
};
use tracing::info;

pub async fn login(
    State(users): State<UserService>,
    JsonBody(input): JsonBody<LoginUser>,
) -> ApiResult<Envelope<Session>> {
    let session = users.login(input).await?;
    Ok(Envelope::ok(session).with_message("Login successful"))
}

pub async fn register(
    State(users): State<UserService>,
    Extension(auth): Extension<AuthContext>,
    JsonBody(input): JsonBody<RegisterUser>,
) -> ApiResult<Created<UserProfile>> {
    let profile = users.register(input).await?;
    info!(registered_by = %auth.user_id, user_id = %profile.id, "Account created");
    Ok(Created(Envelope::ok(profile).with_message("User registered")))
}

pub async fn me(
    State(users): State<UserService>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Envelope<UserProfile>> {
    let profile = users
        .profile(auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;
    Ok(Envelope::ok(profile))
}
