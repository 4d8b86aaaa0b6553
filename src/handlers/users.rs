use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

use crate::error::ApiError;
use crate::services::{CreateUserRequest, UpdateUserRequest, UserService};

const DEFAULT_PAGE_SIZE: i64 = 10;

pub fn routes(users: Arc<UserService>) -> Router {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
        .with_state(users)
}

fn validate_create(req: &CreateUserRequest) -> Result<(), ApiError> {
    if req.email.is_empty() || !req.email.contains('@') {
        return Err(ApiError::validation("a valid email is required"));
    }
    if req.password.len() < 6 {
        return Err(ApiError::validation("password must be at least 6 characters"));
    }
    if req.first_name.is_empty() || req.last_name.is_empty() {
        return Err(ApiError::validation("first and last name are required"));
    }
    Ok(())
}

fn user_id(path: Result<Path<Uuid>, PathRejection>) -> Result<Uuid, ApiError> {
    path.map(|Path(id)| id)
        .map_err(|_| ApiError::validation("invalid user ID"))
}

/// POST /users
async fn create_user(
    State(users): State<Arc<UserService>>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Json(req) = payload.map_err(|e| ApiError::validation(e.body_text()))?;
    validate_create(&req)?;

    let user = users.create_user(req).await?;
    Ok((StatusCode::CREATED, Json(json!(user))))
}

#[derive(Debug, Default, Deserialize)]
pub struct ListUsersQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// GET /users
async fn list_users(
    State(users): State<Arc<UserService>>,
    query: Result<Query<ListUsersQuery>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::validation(e.body_text()))?;
    let limit = match query.limit {
        Some(limit) if limit > 0 => limit,
        _ => DEFAULT_PAGE_SIZE,
    };
    let offset = query.offset.unwrap_or(0).max(0);

    let (list, total) = users.list_users(limit, offset).await?;
    Ok(Json(json!({
        "data": list,
        "total": total,
        "limit": limit,
        "offset": offset,
    })))
}

/// GET /users/:id
async fn get_user(
    State(users): State<Arc<UserService>>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Value>, ApiError> {
    let id = user_id(path)?;
    let user = users.get_user(id).await?;
    Ok(Json(json!(user)))
}

/// PUT /users/:id
async fn update_user(
    State(users): State<Arc<UserService>>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let id = user_id(path)?;
    let Json(req) = payload.map_err(|e| ApiError::validation(e.body_text()))?;

    let user = users.update_user(id, req).await?;
    Ok(Json(json!(user)))
}

/// DELETE /users/:id
async fn delete_user(
    State(users): State<Arc<UserService>>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Value>, ApiError> {
    let id = user_id(path)?;
    users.delete_user(id).await?;
    Ok(Json(json!({ "message": "user deleted successfully" })))
}
