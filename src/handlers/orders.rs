use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{middleware, Extension, Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::JwtService;
use crate::error::ApiError;
use crate::middleware::{require_auth, AuthUser};
use crate::database::repository::OrderFilters;
use crate::services::{
    CreateOrderRequest, OrderService, SuggestionRequest, UpdateOrderRequest,
};

const MIN_SUMMARY_LENGTH: usize = 10;

pub fn routes(orders: Arc<OrderService>, jwt: Arc<JwtService>) -> Router {
    let protected = Router::new()
        .route("/orders", get(list_orders).post(create_order))
        .route("/orders/:id", get(get_order).put(update_order))
        .layer(middleware::from_fn_with_state(jwt, require_auth))
        .with_state(orders.clone());

    Router::new()
        .route("/orders/suggestions", post(ai_suggestions))
        .with_state(orders)
        .merge(protected)
}

fn validate_summary(summary: &str) -> Result<(), ApiError> {
    if summary.chars().count() < MIN_SUMMARY_LENGTH {
        return Err(ApiError::validation(format!(
            "summary must be at least {} characters",
            MIN_SUMMARY_LENGTH
        )));
    }
    Ok(())
}

fn order_id(path: Result<Path<Uuid>, PathRejection>) -> Result<Uuid, ApiError> {
    path.map(|Path(id)| id)
        .map_err(|_| ApiError::validation("invalid order ID"))
}

/// POST /orders/suggestions (public)
async fn ai_suggestions(
    State(orders): State<Arc<OrderService>>,
    payload: Result<Json<SuggestionRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(req) = payload.map_err(|e| ApiError::validation(e.body_text()))?;
    validate_summary(&req.summary)?;

    let suggestions = orders.ai_suggestions(&req).await?;
    let count = suggestions.len();
    Ok(Json(json!({
        "suggestions": suggestions,
        "count": count,
    })))
}

/// POST /orders
async fn create_order(
    State(orders): State<Arc<OrderService>>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<CreateOrderRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Json(req) = payload.map_err(|e| ApiError::validation(e.body_text()))?;
    validate_summary(&req.summary)?;

    let order = orders.create_order(user.user_id, req).await?;
    Ok((StatusCode::CREATED, Json(json!(order))))
}

#[derive(Debug, Default, Deserialize)]
pub struct ListOrdersQuery {
    pub status: Option<String>,
    pub delivery_preference: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl From<ListOrdersQuery> for OrderFilters {
    fn from(query: ListOrdersQuery) -> Self {
        OrderFilters {
            status: query.status,
            delivery_preference: query.delivery_preference,
            sort_by: query.sort_by,
            sort_order: query.sort_order,
            limit: query.limit.unwrap_or(0),
            offset: query.offset.unwrap_or(0),
        }
    }
}

/// GET /orders
async fn list_orders(
    State(orders): State<Arc<OrderService>>,
    Extension(user): Extension<AuthUser>,
    query: Result<Query<ListOrdersQuery>, QueryRejection>,
) -> Result<Json<Value>, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::validation(e.body_text()))?;

    let list = orders.list_orders(user.user_id, query.into()).await?;
    let count = list.len();
    Ok(Json(json!({
        "orders": list,
        "count": count,
    })))
}

/// GET /orders/:id
async fn get_order(
    State(orders): State<Arc<OrderService>>,
    Extension(user): Extension<AuthUser>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Value>, ApiError> {
    let id = order_id(path)?;
    let order = orders.get_order(id, user.user_id).await?;
    Ok(Json(json!(order)))
}

/// PUT /orders/:id
async fn update_order(
    State(orders): State<Arc<OrderService>>,
    Extension(user): Extension<AuthUser>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<UpdateOrderRequest>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let id = order_id(path)?;
    let Json(req) = payload.map_err(|e| ApiError::validation(e.body_text()))?;

    let order = orders.update_order(id, user.user_id, req).await?;
    Ok(Json(json!(order)))
}
