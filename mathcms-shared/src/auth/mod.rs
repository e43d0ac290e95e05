/// Authentication primitives
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`jwt`]: HS256 access token creation and validation
///
/// # Example
///
/// ```no_run
/// use chrono::Duration;
/// use mathcms_shared::auth::jwt::{create_token, validate_token, Claims};
/// use mathcms_shared::auth::password::{hash_password, verify_password};
/// use mathcms_shared::models::user::Role;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("correct horse battery")?;
/// assert!(verify_password("correct horse battery", &hash)?);
///
/// let claims = Claims::new(Uuid::new_v4(), "admin@mathcms.org", Role::Admin, Duration::hours(24));
/// let token = create_token(&claims, "a-secret-that-is-at-least-32-bytes!")?;
/// let decoded = validate_token(&token, "a-secret-that-is-at-least-32-bytes!")?;
/// assert_eq!(decoded.role, Role::Admin);
/// # Ok(())
/// # }
/// ```

pub mod jwt;
pub mod password;

use crate::models::user::Role;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity attached to an authenticated request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthContext {
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
}

impl From<jwt::Claims> for AuthContext {
    fn from(claims: jwt::Claims) -> Self {
        Self {
            user_id: claims.sub,
            email: claims.email,
            role: claims.role,
        }
    }
}
