/// Admin panel accounts
///
/// Users are not exposed as a CRUD resource; they are created through
/// registration (by an admin) or the startup bootstrap, and read back on
/// login. Passwords are stored as Argon2id hashes, never in plaintext, and
/// the hash never leaves the service layer: responses use [`UserProfile`].

use crate::store::{Entity, Record};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Access level carried in the JWT
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    #[default]
    Editor,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Editor => "editor",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Stored lowercase, unique
    pub email: String,

    /// Argon2id PHC string
    pub password_hash: String,

    #[serde(default)]
    pub name: Option<String>,

    pub role: Role,

    /// Linked researcher profile
    #[serde(default)]
    pub researcher: Option<Uuid>,

    #[serde(default)]
    pub last_login_at: Option<DateTime<Utc>>,
}

impl Entity for User {
    const COLLECTION: &'static str = "users";
    const SEARCH_FIELDS: &'static [&'static str] = &["email", "name"];
    const UNIQUE_FIELDS: &'static [&'static str] = &["email"];
}

/// User as returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub role: Role,
    pub researcher: Option<Uuid>,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<&Record<User>> for UserProfile {
    fn from(record: &Record<User>) -> Self {
        Self {
            id: record.id,
            email: record.data.email.clone(),
            name: record.data.name.clone(),
            role: record.data.role,
            researcher: record.data.researcher,
            last_login_at: record.data.last_login_at,
            created_at: record.created_at,
        }
    }
}

/// Body of `POST /auth/register`
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default, rename_all = "camelCase")]
pub struct RegisterUser {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,

    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    pub name: Option<String>,

    pub role: Role,

    pub researcher: Option<Uuid>,
}

/// Body of `POST /auth/login`
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(default)]
pub struct LoginUser {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}
