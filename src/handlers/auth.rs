use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{middleware, Extension, Json, Router};
use serde::Deserialize;
use std::sync::Arc;

use crate::auth::JwtService;
use crate::database::models::User;
use crate::error::ApiError;
use crate::middleware::{require_auth, AuthUser};
use crate::services::{AuthService, LoginResponse};

pub fn routes(auth: Arc<AuthService>, jwt: Arc<JwtService>) -> Router {
    let protected = Router::new()
        .route("/me", get(me))
        .layer(middleware::from_fn_with_state(jwt, require_auth))
        .with_state(auth.clone());

    Router::new()
        .route("/auth/login", post(login))
        .with_state(auth)
        .merge(protected)
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    fn validate(&self) -> Result<(), ApiError> {
        if self.email.is_empty() || !self.email.contains('@') {
            return Err(ApiError::validation("a valid email is required"));
        }
        if self.password.len() < 6 {
            return Err(ApiError::validation("password must be at least 6 characters"));
        }
        Ok(())
    }
}

/// POST /auth/login
async fn login(
    State(auth): State<Arc<AuthService>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(req) = payload.map_err(|e| ApiError::validation(e.body_text()))?;
    req.validate()?;

    let response = auth.login(&req.email, &req.password).await?;
    Ok(Json(response))
}

/// GET /me
async fn me(
    State(auth): State<Arc<AuthService>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<User>, ApiError> {
    Ok(Json(auth.current_user(user.user_id).await?))
}
