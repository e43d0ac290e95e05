/// Authentication gate
///
/// Every protected route goes through [`require_auth`]. The gate reads
/// `Authorization: Bearer <token>`, validates the JWT and inserts the
/// caller's [`AuthContext`] into the request extensions. A gate built with
/// [`Gate::role`] additionally rejects callers with a different role.
///
/// # Example
///
/// ```no_run
/// use axum::{routing::get, Extension, Router};
/// use mathcms_api::middleware::gate::{require_auth, Gate};
/// use mathcms_shared::auth::AuthContext;
///
/// async fn whoami(Extension(auth): Extension<AuthContext>) -> String {
///     auth.email
/// }
///
/// let gate = Gate::new("a-secret-that-is-at-least-32-bytes!");
/// let app: Router = Router::new()
///     .route("/me", get(whoami))
///     .route_layer(axum::middleware::from_fn_with_state(gate, require_auth));
/// ```

use crate::error::ApiError;
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use mathcms_shared::auth::{jwt, AuthContext};
use mathcms_shared::models::user::Role;
use std::sync::Arc;
use tracing::debug;

#[derive(Clone)]
pub struct Gate {
    secret: Arc<str>,
    role: Option<Role>,
}

impl Gate {
    /// Admits any valid token
    pub fn new(secret: &str) -> Self {
        Self {
            secret: Arc::from(secret),
            role: None,
        }
    }

    /// Admits only tokens carrying `role`
    pub fn role(&self, role: Role) -> Self {
        Self {
            secret: Arc::clone(&self.secret),
            role: Some(role),
        }
    }

    fn authenticate(&self, authorization: Option<&str>) -> Result<AuthContext, ApiError> {
        let header = authorization
            .ok_or_else(|| ApiError::Unauthorized("Missing authorization header".to_string()))?;

        let token = header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| ApiError::Unauthorized("Expected Bearer token".to_string()))?;

        let auth = AuthContext::from(jwt::validate_token(token, &self.secret)?);

        if let Some(required) = self.role {
            if auth.role != required {
                debug!(user_id = %auth.user_id, role = %auth.role, required = %required, "Role rejected");
                return Err(ApiError::Forbidden(format!("Requires {} role", required)));
            }
        }

        Ok(auth)
    }
}

pub async fn require_auth(
    State(gate): State<Gate>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let authorization = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let auth = gate.authenticate(authorization)?;
    req.extensions_mut().insert(auth);

    Ok(next.run(req).await)
}
