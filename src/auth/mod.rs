use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::SecurityConfig;

/// Signed token payload. A transient projection of the authenticated
/// identity; never persisted, no revocation list.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: Uuid,
    pub email: String,
    pub iat: i64,
    pub nbf: i64,
    pub exp: i64,
}

#[derive(Debug, Error, PartialEq)]
pub enum AuthError {
    #[error("invalid token")]
    InvalidToken,
    #[error("token expired")]
    ExpiredToken,
    #[error("token generation error: {0}")]
    TokenGeneration(String),
}

/// Issues and validates HS256-signed identity tokens. Pure: no storage, no
/// side effects beyond the returned value.
pub struct JwtService {
    secret: String,
    validity: Duration,
}

impl JwtService {
    pub fn new(security: &SecurityConfig) -> Self {
        Self {
            secret: security.jwt_secret.clone(),
            validity: Duration::hours(security.jwt_expiry_hours as i64),
        }
    }

    pub fn issue(&self, user_id: Uuid, email: &str) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            user_id,
            email: email.to_string(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: (now + self.validity).timestamp(),
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AuthError::TokenGeneration(e.to_string()))
    }

    pub fn validate(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_nbf = true;

        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
            _ => AuthError::InvalidToken,
        })?;

        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(secret: &str) -> JwtService {
        JwtService::new(&SecurityConfig {
            jwt_secret: secret.to_string(),
            jwt_expiry_hours: 24,
        })
    }

    #[test]
    fn test_issue_then_validate() {
        let jwt = service("unit-test-secret");
        let user_id = Uuid::new_v4();

        let token = jwt.issue(user_id, "a@example.com").unwrap();
        let claims = jwt.validate(&token).unwrap();

        assert_eq!(claims.user_id, user_id);
        assert_eq!(claims.email, "a@example.com");
        assert!(claims.exp > claims.iat);
        assert_eq!(claims.iat, claims.nbf);
    }

    #[test]
    fn test_wrong_secret_is_invalid() {
        let token = service("secret-a").issue(Uuid::new_v4(), "a@example.com").unwrap();
        let err = service("secret-b").validate(&token).unwrap_err();
        assert_eq!(err, AuthError::InvalidToken);
    }

    #[test]
    fn test_malformed_token_is_invalid() {
        let jwt = service("unit-test-secret");
        assert_eq!(jwt.validate("not.a.token").unwrap_err(), AuthError::InvalidToken);
        assert_eq!(jwt.validate("").unwrap_err(), AuthError::InvalidToken);
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let jwt = service("unit-test-secret");
        let now = Utc::now();
        let stale = Claims {
            user_id: Uuid::new_v4(),
            email: "a@example.com".to_string(),
            iat: (now - Duration::hours(2)).timestamp(),
            nbf: (now - Duration::hours(2)).timestamp(),
            exp: (now - Duration::hours(1)).timestamp(),
        };
        let token = encode(
            &Header::default(),
            &stale,
            &EncodingKey::from_secret("unit-test-secret".as_bytes()),
        )
        .unwrap();

        assert_eq!(jwt.validate(&token).unwrap_err(), AuthError::ExpiredToken);
    }
}
