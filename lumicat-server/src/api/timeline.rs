//! Timeline period descriptions

use axum::{
    extract::{Path, State},
    Json,
};
use lumicat_common::db::models::TimelineEntry;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::db;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct TimelineBody {
    #[serde(default)]
    pub description: String,
}

/// GET /api/timeline
pub async fn list_timeline(State(state): State<AppState>) -> ApiResult<Json<Vec<TimelineEntry>>> {
    Ok(Json(db::timeline::list(&state.db).await?))
}

/// PUT /api/timeline/:period
pub async fn put_timeline(
    State(state): State<AppState>,
    Path(period): Path<String>,
    Json(body): Json<TimelineBody>,
) -> ApiResult<Json<TimelineEntry>> {
    let period = period.trim();
    if period.is_empty() {
        return Err(ApiError::BadRequest("period is required".to_string()));
    }

    let entry = db::timeline::upsert(&state.db, period, body.description.trim()).await?;
    Ok(Json(entry))
}

/// DELETE /api/timeline/:period
pub async fn delete_timeline(
    State(state): State<AppState>,
    Path(period): Path<String>,
) -> ApiResult<Json<Value>> {
    if !db::timeline::delete(&state.db, period.trim()).await? {
        return Err(ApiError::NotFound(format!("Period '{}' not found", period)));
    }
    Ok(Json(json!({ "deleted": true })))
}
