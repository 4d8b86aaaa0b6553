use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Map, Value};
use std::sync::Arc;

use crate::error::ApiError;
use crate::services::FeatureFlagService;

pub fn routes(flags: Arc<FeatureFlagService>) -> Router {
    Router::new()
        .route("/feature-flags", get(all_flags))
        .route("/feature-flags/:name", get(flag_by_name))
        .with_state(flags)
}

/// GET /feature-flags
async fn all_flags(
    State(flags): State<Arc<FeatureFlagService>>,
) -> Result<Json<Value>, ApiError> {
    let details = flags.all_flags().await?;

    // Compact name -> enabled map alongside the full records.
    let mut flag_map = Map::new();
    for flag in &details {
        flag_map.insert(flag.name.clone(), Value::Bool(flag.enabled));
    }

    Ok(Json(json!({
        "flags": flag_map,
        "details": details,
    })))
}

/// GET /feature-flags/:name
async fn flag_by_name(
    State(flags): State<Arc<FeatureFlagService>>,
    Path(name): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let flag = flags.flag_by_name(&name).await?;
    Ok(Json(json!(flag)))
}
