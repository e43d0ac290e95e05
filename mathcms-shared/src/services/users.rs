/// Admin panel accounts: login, registration and the bootstrap admin
///
/// Emails are compared lowercase. A failed login does not reveal whether
/// the email exists.

use super::{ServiceError, ServiceResult};
use crate::auth::jwt::{create_token, Claims};
use crate::auth::password::{hash_password, validate_password_strength, verify_password};
use crate::models::user::{LoginUser, RegisterUser, Role, User, UserProfile};
use crate::store::{Backend, ListQuery, Record, Store};
use crate::validation::field_errors;
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

/// Successful login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: UserProfile,
}

#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn Store<User>>,
    jwt_secret: Arc<str>,
    token_ttl: Duration,
}

impl UserService {
    pub fn new(store: Arc<dyn Store<User>>, jwt_secret: &str, token_ttl: Duration) -> Self {
        Self {
            store,
            jwt_secret: Arc::from(jwt_secret),
            token_ttl,
        }
    }

    pub fn from_backend(backend: &Backend, jwt_secret: &str, token_ttl: Duration) -> Self {
        Self::new(backend.store::<User>(), jwt_secret, token_ttl)
    }

    async fn find_by_email(&self, email: &str) -> ServiceResult<Option<Record<User>>> {
        let mut filter = Map::new();
        filter.insert("email".to_string(), Value::String(email.trim().to_lowercase()));

        let mut found = self.store.find(&ListQuery::filtered(filter)).await?;
        Ok(found.pop())
    }

    /// Signs an access token for a stored user
    pub fn issue_token(&self, record: &Record<User>) -> ServiceResult<String> {
        let claims = Claims::new(record.id, &record.data.email, record.data.role, self.token_ttl);
        Ok(create_token(&claims, &self.jwt_secret)?)
    }

    pub async fn login(&self, input: LoginUser) -> ServiceResult<Session> {
        input
            .validate()
            .map_err(|e| ServiceError::Validation(field_errors(&e)))?;

        let Some(mut record) = self.find_by_email(&input.email).await? else {
            warn!("Login attempt for unknown email");
            return Err(ServiceError::InvalidCredentials);
        };

        if !verify_password(&input.password, &record.data.password_hash)? {
            warn!(user_id = %record.id, "Login attempt with wrong password");
            return Err(ServiceError::InvalidCredentials);
        }

        record.data.last_login_at = Some(Utc::now());
        let record = self
            .store
            .replace(record.id, record.data.clone())
            .await?
            .unwrap_or(record);

        let token = self.issue_token(&record)?;
        info!(user_id = %record.id, role = %record.data.role, "User logged in");

        Ok(Session {
            token,
            user: UserProfile::from(&record),
        })
    }

    pub async fn register(&self, input: RegisterUser) -> ServiceResult<UserProfile> {
        input
            .validate()
            .map_err(|e| ServiceError::Validation(field_errors(&e)))?;
        validate_password_strength(&input.password)
            .map_err(|message| ServiceError::validation("password", &message))?;

        let user = User {
            email: input.email.trim().to_lowercase(),
            password_hash: hash_password(&input.password)?,
            name: input
                .name
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty()),
            role: input.role,
            researcher: input.researcher,
            last_login_at: None,
        };

        let record = self.store.insert(user).await?;
        info!(user_id = %record.id, role = %record.data.role, "Registered user");
        Ok(UserProfile::from(&record))
    }

    pub async fn profile(&self, id: Uuid) -> ServiceResult<Option<UserProfile>> {
        Ok(self
            .store
            .find_by_id(id)
            .await?
            .map(|record| UserProfile::from(&record)))
    }

    /// Creates an admin account unless one with this email exists
    ///
    /// Returns whether an account was created.
    pub async fn ensure_admin(&self, email: &str, password: &str) -> ServiceResult<bool> {
        if self.find_by_email(email).await?.is_some() {
            return Ok(false);
        }

        self.register(RegisterUser {
            email: email.to_string(),
            password: password.to_string(),
            name: Some("Administrator".to_string()),
            role: Role::Admin,
            researcher: None,
        })
        .await?;

        info!(email, "Bootstrapped admin account");
        Ok(true)
    }
}
