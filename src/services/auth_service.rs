use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use super::ServiceError;
use crate::auth::JwtService;
use crate::database::models::User;
use crate::database::repository::UserRepository;

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

pub fn hash_password(password: &str) -> Result<String, ServiceError> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST)
        .map_err(|e| ServiceError::Internal(format!("password hashing failed: {}", e)))
}

/// Credential verification and token issuance. Unknown email and wrong
/// password are indistinguishable to the caller.
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    jwt: Arc<JwtService>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, jwt: Arc<JwtService>) -> Self {
        Self { users, jwt }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ServiceError> {
        let mut user = self
            .users
            .get_by_email(email)
            .await?
            .ok_or(ServiceError::InvalidCredentials)?;

        let verified = bcrypt::verify(password, &user.password).unwrap_or(false);
        if !verified {
            return Err(ServiceError::InvalidCredentials);
        }

        let now = Utc::now();
        user.last_login = Some(now);
        user.updated_at = now;
        self.users.update(&user).await?;

        let token = self
            .jwt
            .issue(user.id, &user.email)
            .map_err(|e| ServiceError::Internal(e.to_string()))?;

        Ok(LoginResponse { token, user })
    }

    pub async fn current_user(&self, user_id: Uuid) -> Result<User, ServiceError> {
        self.users
            .get_by_id(user_id)
            .await?
            .ok_or(ServiceError::UserNotFound)
    }
}
